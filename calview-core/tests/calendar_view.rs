use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use calview_core::{
    CalendarView, Event, EventSource, Instant, OverlayCache, Period, RRuleExpansion, SeriesEvent,
};
use chrono::{NaiveDate, TimeZone};
use chrono_tz::UTC;
use parking_lot::Mutex;

const CALENDAR: &str = "work";

fn at(day: u32, hour: u32) -> Instant {
    UTC.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn days(from: u32, to: u32) -> Period {
    Period::days(
        UTC,
        NaiveDate::from_ymd_opt(2024, 1, from).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, to).unwrap(),
    )
    .unwrap()
}

fn remote_events() -> Vec<Event> {
    (1..=28)
        .step_by(3)
        .map(|day| {
            let id = format!("e{day:02}");
            Event::new(&id, CALENDAR, &id, at(day, 9), at(day, 10))
                .with_summary(format!("Event on day {day}"))
        })
        .collect()
}

/// Serves `remote_events` for the requested day-inclusive window and
/// records every window it was asked for.
fn remote(
    requests: Arc<Mutex<Vec<(Instant, Instant)>>>,
    calls: Arc<AtomicUsize>,
) -> impl EventSource {
    move |start: Instant, end: Instant, _timezone: Option<String>| {
        let requests = Arc::clone(&requests);
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            requests.lock().push((start, end));
            tokio::task::yield_now().await;
            let window = Period::new(start, end)?;
            anyhow::Ok(remote_events()
                .into_iter()
                .filter(|e| window.intersects_days(&e.start, &e.end))
                .collect())
        }
    }
}

fn ids(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.id.as_str()).collect()
}

#[tokio::test]
async fn test_only_unexplored_days_are_fetched() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = OverlayCache::new();
    let source = remote(Arc::clone(&requests), Arc::clone(&calls));
    let mut view = CalendarView::new(cache.wrap(CALENDAR, source));

    let first_week = view.events_in(&days(1, 7), None).await.unwrap();
    assert_eq!(ids(&first_week), vec!["e01", "e04", "e07"]);

    let overlapping = view.events_in(&days(5, 11), None).await.unwrap();
    assert_eq!(ids(&overlapping), vec!["e07", "e10"]);

    let already_known = view.events_in(&days(2, 10), None).await.unwrap();
    assert_eq!(ids(&already_known), vec!["e04", "e07", "e10"]);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *requests.lock(),
        vec![(at(1, 0), at(7, 0)), (at(8, 0), at(11, 0))],
        "Second request should only cover the unexplored days"
    );
    assert_eq!(view.tracker().explored_periods(CALENDAR), &[days(1, 11)]);
}

#[tokio::test]
async fn test_edits_show_up_in_explored_periods() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = OverlayCache::new();
    let mut view = CalendarView::new(cache.wrap(CALENDAR, remote(requests, Arc::clone(&calls))));

    view.events_in(&days(1, 14), None).await.unwrap();

    let moved = Event::new("e04", CALENDAR, "e04", at(5, 14), at(5, 15)).with_summary("Moved");
    let undo_move = cache.register_update(moved).unwrap();
    cache
        .register_delete(Event::new("e07", CALENDAR, "e07", at(7, 9), at(7, 10)))
        .unwrap();
    cache
        .register_add(Event::new("new", CALENDAR, "new", at(2, 12), at(2, 13)))
        .unwrap();

    let events = view.events_in(&days(1, 7), None).await.unwrap();
    assert_eq!(ids(&events), vec!["e01", "new", "e04"]);
    assert_eq!(events[2].summary, "Moved");

    assert!(cache.undo(&undo_move));
    let events = view.events_in(&days(1, 7), None).await.unwrap();
    assert_eq!(events[2].start, at(4, 9));

    assert_eq!(calls.load(Ordering::SeqCst), 1, "Edits never trigger a refetch");
}

#[tokio::test]
async fn test_recurring_series_is_expanded_per_window() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = OverlayCache::new();
    let mut view = CalendarView::new(cache.wrap(CALENDAR, remote(requests, calls)));

    // 2024-01-01 is a Monday
    let standup =
        Event::new("standup", CALENDAR, "standup", at(1, 8), at(1, 9)).with_summary("Standup");
    cache
        .register_add(SeriesEvent::new(standup, RRuleExpansion::new("FREQ=WEEKLY;BYDAY=MO")))
        .unwrap();

    let events = view.events_in(&days(1, 14), None).await.unwrap();
    let standups: Vec<_> = events.iter().filter(|e| e.uid == "standup").collect();

    assert_eq!(standups.len(), 2);
    assert!(standups.iter().all(|e| e.is_instance()));
    assert_eq!(standups[1].start, at(8, 8));
}

#[tokio::test]
async fn test_invalidate_refetches() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = OverlayCache::new();
    let mut view = CalendarView::new(cache.wrap(CALENDAR, remote(requests, Arc::clone(&calls))));

    view.events_in(&days(1, 7), None).await.unwrap();
    view.invalidate();
    assert!(view.tracker().explored_periods(CALENDAR).is_empty());

    view.events_in(&days(1, 7), None).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_undo_after_fetch_restores_source_event() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = OverlayCache::new();
    let mut view = CalendarView::new(cache.wrap(CALENDAR, remote(requests, Arc::clone(&calls))));

    let undo_delete = cache
        .register_delete(Event::new("e04", CALENDAR, "e04", at(4, 9), at(4, 10)))
        .unwrap();

    let events = view.events_in(&days(1, 7), None).await.unwrap();
    assert_eq!(ids(&events), vec!["e01", "e07"]);

    assert!(cache.undo(&undo_delete));
    let events = view.events_in(&days(1, 7), None).await.unwrap();
    assert_eq!(ids(&events), vec!["e01", "e04", "e07"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

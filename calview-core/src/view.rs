//! Window-by-window calendar loading, the way a calendar UI drives the
//! coverage tracker, the event store and a wrapped source together.

use tracing::debug;

use crate::coverage::PeriodCoverageTracker;
use crate::error::CalViewResult;
use crate::event::Event;
use crate::overlay::WrappedSource;
use crate::period::Period;
use crate::source::EventSource;
use crate::store::EventStore;

pub struct CalendarView<S> {
    tracker: PeriodCoverageTracker,
    store: EventStore,
    source: WrappedSource<S>,
}

impl<S: EventSource> CalendarView<S> {
    pub fn new(source: WrappedSource<S>) -> Self {
        CalendarView {
            tracker: PeriodCoverageTracker::new(),
            store: EventStore::new(),
            source,
        }
    }

    pub fn calendar_id(&self) -> &str {
        self.source.calendar_id()
    }

    pub fn tracker(&self) -> &PeriodCoverageTracker {
        &self.tracker
    }

    /// Events of the day-inclusive `period`, sorted by start then id.
    ///
    /// Only the days never fetched before go to the source. The store keeps
    /// what the source returned and pending edits are applied on every call,
    /// so edits registered or undone after a period was fetched show up.
    pub async fn events_in(
        &mut self,
        period: &Period,
        timezone: Option<&str>,
    ) -> CalViewResult<Vec<Event>> {
        let calendar_id = self.source.calendar_id().to_string();
        let window = period.to_days();

        for gap in self.tracker.unexplored_periods_in_period(&calendar_id, &window) {
            debug!(calendar_id, %gap, "fetching unexplored period");
            let fetched = self.source.fetch_unmodified(&gap, timezone).await?;
            self.store.save_all(fetched)?;
            self.tracker.register_explored_period(&calendar_id, &gap)?;
        }

        let raw = Period::new(window.start(), window.exclusive_end())?;
        let stored = self.store.get_in_period(&calendar_id, &raw);

        let mut events = self.source.overlay().apply(&calendar_id, stored, &window);
        events.retain(|e| window.intersects_days(&e.start, &e.end));
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        Ok(events)
    }

    /// Forget everything fetched so far; the next call refetches.
    pub fn invalidate(&mut self) {
        let calendar_id = self.source.calendar_id();
        self.tracker.reset(Some(calendar_id));
        self.store.reset(Some(calendar_id));
    }
}

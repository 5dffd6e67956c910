use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{Result, bail};
use calview_core::{CalendarView, MutationKind, OverlayCache, Period, config::CalViewConfig};
use chrono::NaiveDate;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use tracing::info;

use crate::render::{Render, render_days};
use crate::source::{JsonFileSource, load_pending};

pub struct EventsArgs {
    pub source: PathBuf,
    pub pending: Option<PathBuf>,
    pub calendar: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub step_days: u64,
    pub json: bool,
}

pub async fn run(args: EventsArgs, config: &CalViewConfig, tz: Tz) -> Result<()> {
    if args.step_days == 0 {
        bail!("--step-days must be at least 1");
    }
    let range = Period::days(tz, args.from, args.to)?;

    let source = JsonFileSource::new(args.source, &args.calendar, tz, config.recurrence_limit);
    let fetches = source.fetch_counter();

    let overlay = OverlayCache::new();
    let mut view = CalendarView::new(overlay.wrap(args.calendar.as_str(), source));

    if let Some(path) = &args.pending {
        for (kind, item) in load_pending(path, tz, config.recurrence_limit).await? {
            match kind {
                MutationKind::Add => overlay.register_add(item)?,
                MutationKind::Update => overlay.register_update(item)?,
                MutationKind::Delete => overlay.register_delete(item)?,
            };
        }
    }

    // Scroll through the range one window at a time, the way a calendar UI would
    let mut window_start = args.from;
    while window_start <= args.to {
        let window_end = window_start
            .checked_add_days(chrono::Days::new(args.step_days - 1))
            .map_or(args.to, |end| end.min(args.to));

        let window = Period::days(tz, window_start, window_end)?;
        let events = view.events_in(&window, Some(tz.name())).await?;
        info!(%window, events = events.len(), "loaded window");

        match window_end.succ_opt() {
            Some(next) => window_start = next,
            None => break,
        }
    }

    // Everything is explored now, so this is served from the store
    let events = view.events_in(&range, Some(tz.name())).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let pending = overlay.pending(view.calendar_id());
    if !pending.is_empty() {
        println!("{}", "Pending changes:".dimmed());
        for mutation in &pending {
            println!("  {}", mutation.render());
        }
        println!();
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
    } else {
        println!("{}", render_days(&events));
    }

    println!();
    let summary = format!(
        "{} events, {} source fetches",
        events.len(),
        fetches.load(Ordering::SeqCst)
    );
    println!("{}", summary.dimmed());

    Ok(())
}

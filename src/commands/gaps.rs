use anyhow::Result;
use calview_core::{Period, PeriodCoverageTracker};
use chrono::NaiveDate;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::DaySpan;

/// Calendar id the spans are registered under; gaps are per calendar.
const CALENDAR: &str = "cli";

pub fn run(explored: &[DaySpan], from: NaiveDate, to: NaiveDate, tz: Tz) -> Result<()> {
    let mut tracker = PeriodCoverageTracker::new();
    for span in explored {
        tracker.register_explored_period(CALENDAR, &Period::days(tz, span.from, span.to)?)?;
    }

    println!("{}", "Explored:".dimmed());
    for period in tracker.explored_periods(CALENDAR) {
        println!("  {}", period.render());
    }

    let query = Period::days(tz, from, to)?;
    let gaps = tracker.unexplored_periods_in_period(CALENDAR, &query);

    println!("{}", format!("Unexplored in {}:", query).dimmed());
    if gaps.is_empty() {
        println!("  {}", "nothing to fetch".green());
    }
    for gap in &gaps {
        println!("  {}", gap.render());
    }

    Ok(())
}

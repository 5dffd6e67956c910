//! RRULE expansion for recurring events.
//!
//! Expands a series master into individual instances within a date range,
//! skipping EXDATEs.

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;
use tracing::debug;

use crate::error::{CalViewError, CalViewResult};
use crate::event::Event;
use crate::instant::Instant;

/// Instances produced per expansion unless configured otherwise.
pub const DEFAULT_RECURRENCE_LIMIT: u16 = 365;

/// Turns a series master into its concrete instances.
pub trait Expand: Send + Sync {
    /// Instances of `series` whose start lies within `[range_start, range_end]`.
    fn expand(
        &self,
        series: &Event,
        range_start: Instant,
        range_end: Instant,
    ) -> CalViewResult<Vec<Event>>;
}

/// Expansion driven by an iCalendar RRULE plus optional EXDATEs.
#[derive(Debug, Clone)]
pub struct RRuleExpansion {
    rrule: String,
    exdates: Vec<Instant>,
    limit: u16,
}

impl RRuleExpansion {
    /// `rrule` is the rule body, e.g. `FREQ=WEEKLY;BYDAY=MO`.
    pub fn new(rrule: impl Into<String>) -> Self {
        RRuleExpansion {
            rrule: rrule.into(),
            exdates: Vec::new(),
            limit: DEFAULT_RECURRENCE_LIMIT,
        }
    }

    pub fn with_exdates(mut self, exdates: Vec<Instant>) -> Self {
        self.exdates = exdates;
        self
    }

    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }
}

/// Property value suffix for a zoned instant: `;TZID=Europe/Paris:20240101T100000`
/// or `:20240101T100000Z` for UTC.
fn ics_time(instant: &Instant) -> String {
    if instant.timezone() == Tz::UTC {
        format!(":{}", instant.format("%Y%m%dT%H%M%SZ"))
    } else {
        format!(
            ";TZID={}:{}",
            instant.timezone().name(),
            instant.format("%Y%m%dT%H%M%S")
        )
    }
}

/// Build an iCalendar-format RRULE string for the rrule crate parser.
fn build_rrule_string(start: &Instant, rrule: &str, exdates: &[Instant]) -> String {
    let mut lines = Vec::with_capacity(exdates.len() + 2);

    lines.push(format!("DTSTART{}", ics_time(start)));
    lines.push(format!("RRULE:{}", rrule));

    for exdate in exdates {
        lines.push(format!("EXDATE{}", ics_time(exdate)));
    }

    lines.join("\n")
}

/// Id given to a generated instance: the series id plus its occurrence start.
pub fn instance_id(series_id: &str, occurrence: &Instant) -> String {
    format!("{}/{}", series_id, occurrence.format("%Y%m%dT%H%M%S"))
}

impl Expand for RRuleExpansion {
    fn expand(
        &self,
        series: &Event,
        range_start: Instant,
        range_end: Instant,
    ) -> CalViewResult<Vec<Event>> {
        let rrule_str = build_rrule_string(&series.start, &self.rrule, &self.exdates);

        let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
            CalViewError::Recurrence(format!(
                "Failed to parse RRULE for event '{}': {}",
                series.uid, e
            ))
        })?;

        // after/before are exclusive, widen by a second to keep the bounds
        let tz: rrule::Tz = Utc.into();
        let after = (range_start.with_timezone(&Utc) - Duration::seconds(1)).with_timezone(&tz);
        let before = (range_end.with_timezone(&Utc) + Duration::seconds(1)).with_timezone(&tz);

        let result = rrule_set.after(after).before(before).all(self.limit);
        if result.limited {
            debug!(
                uid = %series.uid,
                limit = self.limit,
                "recurrence expansion hit its instance limit"
            );
        }

        let zone = series.start.timezone();
        let duration = series.end - series.start;

        let instances = result
            .dates
            .iter()
            .map(|occurrence| {
                let start = occurrence.with_timezone(&zone);
                Event {
                    id: instance_id(&series.id, &start),
                    calendar_id: series.calendar_id.clone(),
                    uid: series.uid.clone(),
                    summary: series.summary.clone(),
                    start,
                    end: start + duration,
                    recurrence_id: Some(start),
                }
            })
            .collect();

        Ok(instances)
    }
}

//! Tracking of already-fetched periods per calendar.
//!
//! Periods here are day-inclusive: each one covers every calendar day from
//! `start` through `end`. The coverage set of a calendar is kept sorted by
//! start with no two entries overlapping or on consecutive days.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CalViewError, CalViewResult};
use crate::instant;
use crate::period::Period;

#[derive(Debug, Default)]
pub struct PeriodCoverageTracker {
    explored: HashMap<String, Vec<Period>>,
}

impl PeriodCoverageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `period` has been fully fetched for `calendar_id`.
    pub fn register_explored_period(
        &mut self,
        calendar_id: &str,
        period: &Period,
    ) -> CalViewResult<()> {
        if calendar_id.is_empty() {
            return Err(CalViewError::InvalidArgument(
                "Cannot register an explored period without a calendar id".into(),
            ));
        }

        let periods = self.explored.entry(calendar_id.to_string()).or_default();
        periods.push(period.to_days());
        normalize(periods);

        debug!(calendar_id, %period, spans = periods.len(), "registered explored period");
        Ok(())
    }

    /// The maximal sub-periods of `period` not yet explored, in order.
    pub fn unexplored_periods_in_period(&self, calendar_id: &str, period: &Period) -> Vec<Period> {
        let query = period.to_days();

        let Some(explored) = self.explored.get(calendar_id) else {
            return vec![query];
        };

        let mut gaps = Vec::new();
        let mut cursor = query.start();

        for covered in explored {
            if covered.end() < cursor {
                continue;
            }
            if covered.start() > query.end() {
                break;
            }
            if covered.start() > cursor {
                gaps.push(Period::between(cursor, instant::previous_day(&covered.start())));
            }
            cursor = covered.exclusive_end();
            if cursor > query.end() {
                break;
            }
        }

        if cursor <= query.end() {
            gaps.push(Period::between(cursor, query.end()));
        }

        gaps
    }

    /// The normalized coverage set of `calendar_id`.
    pub fn explored_periods(&self, calendar_id: &str) -> &[Period] {
        self.explored
            .get(calendar_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Forget explored periods of one calendar, or of every calendar.
    pub fn reset(&mut self, calendar_id: Option<&str>) {
        match calendar_id {
            Some(id) => {
                self.explored.remove(id);
            }
            None => self.explored.clear(),
        }
    }
}

/// Sort by start and merge overlapping or day-adjacent periods.
fn normalize(periods: &mut Vec<Period>) {
    periods.sort_by_key(|p| p.start());

    let mut merged: Vec<Period> = Vec::with_capacity(periods.len());
    for period in periods.drain(..) {
        match merged.last_mut() {
            Some(last) if period.start() <= last.exclusive_end() => {
                if period.end() > last.end() {
                    *last = Period::between(last.start(), period.end());
                }
            }
            _ => merged.push(period),
        }
    }

    *periods = merged;
}

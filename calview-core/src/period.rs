//! Time periods.
//!
//! A `Period` is used under two conventions that must not be mixed:
//! - raw: a closed interval on exact instants (event store lookups)
//! - day-inclusive: `end` is midnight of the last included day, so the
//!   period really extends up to `end + 1 day` (exclusive)

use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::{CalViewError, CalViewResult};
use crate::instant::{self, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    start: Instant,
    end: Instant,
}

impl Period {
    pub fn new(start: Instant, end: Instant) -> CalViewResult<Self> {
        if start > end {
            return Err(CalViewError::InvalidArgument(format!(
                "Period start {} is after its end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Period { start, end })
    }

    /// Day-inclusive period covering `from..=to` in `tz`.
    pub fn days(tz: Tz, from: NaiveDate, to: NaiveDate) -> CalViewResult<Self> {
        Period::new(instant::midnight(tz, from), instant::midnight(tz, to))
    }

    /// Bounds already known to be ordered.
    pub(crate) fn between(start: Instant, end: Instant) -> Self {
        debug_assert!(start <= end);
        Period { start, end }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    /// Exclusive upper bound of a day-inclusive period. A day-aligned end
    /// gives the start of the next day, even when that day starts late.
    pub fn exclusive_end(&self) -> Instant {
        if self.end == instant::start_of_day(&self.end) {
            instant::next_day(&self.end)
        } else {
            instant::add_days(&self.end, 1)
        }
    }

    /// Truncate both bounds to the start of their day.
    pub fn to_days(&self) -> Period {
        Period::between(
            instant::start_of_day(&self.start),
            instant::start_of_day(&self.end),
        )
    }

    /// Widen the period by `days` calendar days on each side.
    pub fn padded(&self, days: u64) -> Period {
        Period::between(
            instant::sub_days(&self.start, days),
            instant::add_days(&self.end, days),
        )
    }

    /// Raw closed-interval overlap with `[start, end]`.
    pub fn overlaps(&self, start: &Instant, end: &Instant) -> bool {
        *start <= self.end && *end >= self.start
    }

    /// Day-inclusive intersection with a span starting at `start` and ending at `end`.
    pub fn intersects_days(&self, start: &Instant, end: &Instant) -> bool {
        *start < self.exclusive_end() && *end > self.start
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

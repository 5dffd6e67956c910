//! Calendar event types.
//!
//! Events are identified by `id` within their calendar; `uid` groups the
//! instances of one recurring series. A pending edit carries a
//! `CalendarItem`, which is either a plain event or a series that can be
//! expanded into instances for a time range.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{CalViewError, CalViewResult};
use crate::instant::Instant;
use crate::recurrence::Expand;

/// A concrete calendar event as returned by an event source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub uid: String,
    pub summary: String,
    pub start: Instant,
    pub end: Instant,
    /// Original start of this occurrence, set on instances of a series
    pub recurrence_id: Option<Instant>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        calendar_id: impl Into<String>,
        uid: impl Into<String>,
        start: Instant,
        end: Instant,
    ) -> Self {
        Event {
            id: id.into(),
            calendar_id: calendar_id.into(),
            uid: uid.into(),
            summary: String::new(),
            start,
            end,
            recurrence_id: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn is_instance(&self) -> bool {
        self.recurrence_id.is_some()
    }

    pub fn validate(&self) -> CalViewResult<()> {
        let missing = [
            ("id", &self.id),
            ("calendar_id", &self.calendar_id),
            ("uid", &self.uid),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty());

        if let Some((field, _)) = missing {
            return Err(CalViewError::InvalidArgument(format!(
                "Event is missing its {field}"
            )));
        }

        if self.start > self.end {
            return Err(CalViewError::InvalidArgument(format!(
                "Event '{}' starts after it ends",
                self.id
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summary.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}", self.summary)
        }
    }
}

/// A recurring series: its master event plus the rule that expands it.
#[derive(Clone)]
pub struct SeriesEvent {
    pub event: Event,
    expansion: Arc<dyn Expand>,
}

impl SeriesEvent {
    pub fn new(event: Event, expansion: impl Expand + 'static) -> Self {
        SeriesEvent {
            event,
            expansion: Arc::new(expansion),
        }
    }

    /// Concrete instances of the series starting within `[range_start, range_end]`.
    pub fn expand(&self, range_start: Instant, range_end: Instant) -> CalViewResult<Vec<Event>> {
        self.expansion.expand(&self.event, range_start, range_end)
    }
}

impl fmt::Debug for SeriesEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesEvent")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

/// An event as carried by a pending local edit.
#[derive(Debug, Clone)]
pub enum CalendarItem {
    Single(Event),
    Recurring(SeriesEvent),
}

impl CalendarItem {
    pub fn event(&self) -> &Event {
        match self {
            CalendarItem::Single(event) => event,
            CalendarItem::Recurring(series) => &series.event,
        }
    }

    pub fn id(&self) -> &str {
        &self.event().id
    }

    pub fn calendar_id(&self) -> &str {
        &self.event().calendar_id
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, CalendarItem::Recurring(_))
    }
}

impl From<Event> for CalendarItem {
    fn from(event: Event) -> Self {
        CalendarItem::Single(event)
    }
}

impl From<SeriesEvent> for CalendarItem {
    fn from(series: SeriesEvent) -> Self {
        CalendarItem::Recurring(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::UTC;

    fn event(id: &str) -> Event {
        let start = UTC.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let end = UTC.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        Event::new(id, "cal", id, start, end)
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(event("a").validate().is_ok());

        let mut no_calendar = event("a");
        no_calendar.calendar_id.clear();
        match no_calendar.validate() {
            Err(CalViewError::InvalidArgument(msg)) => assert!(msg.contains("calendar_id")),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }

        assert!(event("").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reversed_event() {
        let mut reversed = event("a");
        std::mem::swap(&mut reversed.start, &mut reversed.end);
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_calendar_item_accessors() {
        let single = CalendarItem::from(event("a").with_summary("Standup"));

        assert_eq!(single.id(), "a");
        assert_eq!(single.calendar_id(), "cal");
        assert!(!single.is_recurring());
        assert_eq!(single.event().to_string(), "Standup");
    }
}

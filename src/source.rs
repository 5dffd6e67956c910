//! JSON files standing in for a remote calendar server.
//!
//! An events file holds a JSON array of event records; a pending file holds
//! a JSON array of `{ "kind": "add" | "update" | "delete", "event": {...} }`.
//! Records with an `rrule` are recurring series.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use calview_core::{
    CalendarItem, Event, EventSource, Instant, MutationKind, Period, RRuleExpansion, SeriesEvent,
};
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub calendar_id: String,
    /// Defaults to the id
    pub uid: Option<String>,
    #[serde(default)]
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub rrule: Option<String>,
    #[serde(default)]
    pub exdates: Vec<DateTime<FixedOffset>>,
}

impl EventRecord {
    /// Read the record in `tz`; series get an RRULE expansion capped at `limit`.
    pub fn into_item(self, tz: Tz, limit: u16) -> CalendarItem {
        let uid = self.uid.unwrap_or_else(|| self.id.clone());
        let event = Event::new(
            self.id,
            self.calendar_id,
            uid,
            self.start.with_timezone(&tz),
            self.end.with_timezone(&tz),
        )
        .with_summary(self.summary);

        match self.rrule {
            Some(rrule) => {
                let exdates = self.exdates.iter().map(|d| d.with_timezone(&tz)).collect();
                let expansion = RRuleExpansion::new(rrule)
                    .with_exdates(exdates)
                    .with_limit(limit);
                SeriesEvent::new(event, expansion).into()
            }
            None => event.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingKind {
    Add,
    Update,
    Delete,
}

impl From<PendingKind> for MutationKind {
    fn from(kind: PendingKind) -> Self {
        match kind {
            PendingKind::Add => MutationKind::Add,
            PendingKind::Update => MutationKind::Update,
            PendingKind::Delete => MutationKind::Delete,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PendingRecord {
    pub kind: PendingKind,
    pub event: EventRecord,
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub async fn load_pending(
    path: &Path,
    tz: Tz,
    limit: u16,
) -> Result<Vec<(MutationKind, CalendarItem)>> {
    let records: Vec<PendingRecord> = read_json(path).await?;
    Ok(records
        .into_iter()
        .map(|r| (r.kind.into(), r.event.into_item(tz, limit)))
        .collect())
}

/// Serves one calendar out of an events file, re-reading it on every fetch
/// like a server would answer every request.
pub struct JsonFileSource {
    path: PathBuf,
    calendar_id: String,
    tz: Tz,
    limit: u16,
    fetches: Arc<AtomicUsize>,
}

impl JsonFileSource {
    pub fn new(path: PathBuf, calendar_id: &str, tz: Tz, limit: u16) -> Self {
        JsonFileSource {
            path,
            calendar_id: calendar_id.to_string(),
            tz,
            limit,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches served so far, readable after the source is wrapped.
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }

    async fn events_between(&self, start: Instant, end: Instant) -> Result<Vec<Event>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let window = Period::new(start, end)?;
        let padded = window.padded(1);
        let records: Vec<EventRecord> = read_json(&self.path).await?;

        let mut events = Vec::new();
        for record in records.into_iter().filter(|r| r.calendar_id == self.calendar_id) {
            match record.into_item(self.tz, self.limit) {
                CalendarItem::Single(event) => events.push(event),
                CalendarItem::Recurring(series) => {
                    events.extend(series.expand(padded.start(), padded.end())?)
                }
            }
        }
        events.retain(|e| window.intersects_days(&e.start, &e.end));

        Ok(events)
    }
}

impl EventSource for JsonFileSource {
    async fn fetch(
        &self,
        start: Instant,
        end: Instant,
        _timezone: Option<&str>,
    ) -> Result<Vec<Event>> {
        self.events_between(start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::UTC;
    use std::io::Write;

    const EVENTS: &str = r#"[
        {"id": "a", "calendar_id": "work", "summary": "Planning",
         "start": "2024-01-02T09:00:00Z", "end": "2024-01-02T10:00:00Z"},
        {"id": "b", "calendar_id": "home",
         "start": "2024-01-02T18:00:00Z", "end": "2024-01-02T19:00:00Z"},
        {"id": "c", "calendar_id": "work",
         "start": "2024-01-20T09:00:00Z", "end": "2024-01-20T10:00:00Z"},
        {"id": "standup", "calendar_id": "work", "summary": "Standup",
         "start": "2024-01-01T08:00:00Z", "end": "2024-01-01T08:15:00Z",
         "rrule": "FREQ=DAILY", "exdates": ["2024-01-03T08:00:00Z"]}
    ]"#;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn first_days() -> Period {
        Period::days(
            UTC,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_source_serves_calendar_window_with_instances() {
        let file = write_file(EVENTS);
        let source = JsonFileSource::new(file.path().to_path_buf(), "work", UTC, 365);
        let window = first_days();

        let events = source.fetch(window.start(), window.end(), None).await.unwrap();
        let mut ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        ids.sort();

        assert_eq!(
            ids,
            vec![
                "a",
                "standup/20240101T080000",
                "standup/20240102T080000",
                "standup/20240104T080000"
            ]
        );
        assert_eq!(source.fetch_counter().load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_pending_reads_kinds_and_series() {
        let file = write_file(
            r#"[
            {"kind": "delete", "event": {"id": "a", "calendar_id": "work",
              "start": "2024-01-02T09:00:00Z", "end": "2024-01-02T10:00:00Z"}},
            {"kind": "add", "event": {"id": "gym", "calendar_id": "work",
              "start": "2024-01-01T18:00:00+01:00", "end": "2024-01-01T19:00:00+01:00",
              "rrule": "FREQ=WEEKLY"}}
        ]"#,
        );

        let pending = load_pending(file.path(), UTC, 10).await.unwrap();

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].0, MutationKind::Delete);
        assert!(!pending[0].1.is_recurring());
        assert_eq!(pending[1].0, MutationKind::Add);
        assert!(pending[1].1.is_recurring());
        assert_eq!(pending[1].1.event().start, UTC.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_invalid_json_mentions_the_file() {
        let file = write_file("{ not json");
        let source = JsonFileSource::new(file.path().to_path_buf(), "work", UTC, 365);
        let window = first_days();

        let err = source.fetch(window.start(), window.end(), None).await.unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }
}

//! Deduplicated store of fetched events per calendar.

use std::collections::HashMap;

use tracing::debug;

use crate::error::CalViewResult;
use crate::event::Event;
use crate::period::Period;

#[derive(Debug, Default)]
pub struct EventStore {
    events: HashMap<String, HashMap<String, Event>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the event with the same id in its calendar.
    pub fn save(&mut self, event: Event) -> CalViewResult<()> {
        event.validate()?;

        let calendar = self.events.entry(event.calendar_id.clone()).or_default();
        if let Some(previous) = calendar.insert(event.id.clone(), event) {
            debug!(
                calendar_id = %previous.calendar_id,
                event_id = %previous.id,
                "replaced stored event"
            );
        }
        Ok(())
    }

    pub fn save_all(&mut self, events: impl IntoIterator<Item = Event>) -> CalViewResult<()> {
        events.into_iter().try_for_each(|event| self.save(event))
    }

    /// Stored events of `calendar_id` overlapping the raw closed `period`.
    /// Order is unspecified.
    pub fn get_in_period(&self, calendar_id: &str, period: &Period) -> Vec<Event> {
        self.events
            .get(calendar_id)
            .map(|events| {
                events
                    .values()
                    .filter(|e| period.overlaps(&e.start, &e.end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self, calendar_id: &str) -> usize {
        self.events.get(calendar_id).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.events.values().all(HashMap::is_empty)
    }

    /// Drop stored events of one calendar, or of every calendar.
    pub fn reset(&mut self, calendar_id: Option<&str>) {
        match calendar_id {
            Some(id) => {
                self.events.remove(id);
            }
            None => self.events.clear(),
        }
    }
}

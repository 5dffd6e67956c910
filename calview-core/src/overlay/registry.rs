//! Pending local edits, one per calendar and event id.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::CalViewResult;
use crate::event::CalendarItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Add,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Add => write!(f, "+"),
            MutationKind::Update => write!(f, "~"),
            MutationKind::Delete => write!(f, "-"),
        }
    }
}

/// A local edit not yet reflected by the event source.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub kind: MutationKind,
    pub item: CalendarItem,
}

/// Retracts one registration, as long as nothing replaced it since.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UndoToken {
    calendar_id: String,
    event_id: String,
    version: u64,
}

impl UndoToken {
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

#[derive(Debug)]
struct Registration {
    mutation: Mutation,
    version: u64,
    /// What this registration replaced, reinstated when it is undone
    replaced: Option<Box<Registration>>,
}

/// Replaced registrations kept per key for undo; older ones are forgotten.
pub(crate) const MAX_UNDO_DEPTH: usize = 16;

fn truncate_history(registration: &mut Registration, depth: usize) {
    if depth == 0 {
        registration.replaced = None;
        return;
    }
    if let Some(previous) = registration.replaced.as_deref_mut() {
        truncate_history(previous, depth - 1);
    }
}

#[derive(Debug, Default)]
pub(crate) struct MutationRegistry {
    last_version: u64,
    calendars: HashMap<String, HashMap<String, Registration>>,
}

impl MutationRegistry {
    pub fn register(&mut self, kind: MutationKind, item: CalendarItem) -> CalViewResult<UndoToken> {
        item.event().validate()?;

        self.last_version += 1;
        let token = UndoToken {
            calendar_id: item.calendar_id().to_string(),
            event_id: item.id().to_string(),
            version: self.last_version,
        };

        let calendar = self.calendars.entry(token.calendar_id.clone()).or_default();
        let replaced = calendar.remove(&token.event_id).map(Box::new);
        let mut registration = Registration {
            mutation: Mutation { kind, item },
            version: token.version,
            replaced,
        };
        truncate_history(&mut registration, MAX_UNDO_DEPTH);
        calendar.insert(token.event_id.clone(), registration);

        Ok(token)
    }

    /// Drop whatever is registered for the key. Returns the dropped edit.
    pub fn remove(&mut self, calendar_id: &str, event_id: &str) -> Option<Mutation> {
        let calendar = self.calendars.get_mut(calendar_id)?;
        let removed = calendar.remove(event_id);
        if calendar.is_empty() {
            self.calendars.remove(calendar_id);
        }
        removed.map(|r| r.mutation)
    }

    pub fn undo(&mut self, token: &UndoToken) -> bool {
        let Some(calendar) = self.calendars.get_mut(&token.calendar_id) else {
            return false;
        };

        let is_current = calendar
            .get(&token.event_id)
            .is_some_and(|r| r.version == token.version);
        if !is_current {
            return false;
        }

        if let Some(current) = calendar.remove(&token.event_id) {
            if let Some(replaced) = current.replaced {
                calendar.insert(token.event_id.clone(), *replaced);
            }
        }
        if calendar.is_empty() {
            self.calendars.remove(&token.calendar_id);
        }

        true
    }

    /// Current edits of a calendar, oldest registration first.
    pub fn mutations(&self, calendar_id: &str) -> Vec<Mutation> {
        let Some(calendar) = self.calendars.get(calendar_id) else {
            return Vec::new();
        };

        let mut registrations: Vec<&Registration> = calendar.values().collect();
        registrations.sort_by_key(|r| r.version);
        registrations.into_iter().map(|r| r.mutation.clone()).collect()
    }

    pub fn clear(&mut self, calendar_id: Option<&str>) {
        match calendar_id {
            Some(id) => {
                self.calendars.remove(id);
            }
            None => self.calendars.clear(),
        }
    }
}

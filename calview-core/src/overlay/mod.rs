//! Overlay of pending local edits on top of fetched events.
//!
//! An `OverlayCache` holds one registry of pending adds, updates and deletes
//! shared by every source it wraps. Each wrapped source returns what the
//! underlying source returned, with the edits registered for its calendar
//! applied, so the calendar shows local changes before the server does.

mod in_flight;
mod reconcile;
mod registry;
mod wrapped;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::CalViewResult;
use crate::event::{CalendarItem, Event};
use crate::period::Period;
use crate::source::EventSource;

pub use reconcile::reconcile;
pub use registry::{Mutation, MutationKind, UndoToken};
pub use wrapped::WrappedSource;

use in_flight::InFlightMap;
use registry::MutationRegistry;

#[derive(Clone, Default)]
pub struct OverlayCache {
    registry: Arc<Mutex<MutationRegistry>>,
    in_flight: Arc<InFlightMap>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `source`, which lists the events of `calendar_id`.
    pub fn wrap<S: EventSource>(
        &self,
        calendar_id: impl Into<String>,
        source: S,
    ) -> WrappedSource<S> {
        WrappedSource::new(calendar_id.into(), source, self.clone())
    }

    pub fn register_add(&self, item: impl Into<CalendarItem>) -> CalViewResult<UndoToken> {
        self.register(MutationKind::Add, item.into())
    }

    pub fn register_update(&self, item: impl Into<CalendarItem>) -> CalViewResult<UndoToken> {
        self.register(MutationKind::Update, item.into())
    }

    pub fn register_delete(&self, item: impl Into<CalendarItem>) -> CalViewResult<UndoToken> {
        self.register(MutationKind::Delete, item.into())
    }

    fn register(&self, kind: MutationKind, item: CalendarItem) -> CalViewResult<UndoToken> {
        let token = self.registry.lock().register(kind, item)?;
        debug!(
            calendar_id = token.calendar_id(),
            event_id = token.event_id(),
            %kind,
            "registered pending edit"
        );
        Ok(token)
    }

    /// Remove whatever edit is registered for `event`'s calendar and id.
    pub fn delete_registration(&self, event: &Event) -> Option<Mutation> {
        self.registry.lock().remove(&event.calendar_id, &event.id)
    }

    /// Retract the registration behind `token`, restoring the edit it
    /// replaced. Does nothing (and returns false) once another registration
    /// took its place.
    pub fn undo(&self, token: &UndoToken) -> bool {
        let undone = self.registry.lock().undo(token);
        debug!(
            calendar_id = token.calendar_id(),
            event_id = token.event_id(),
            undone,
            "undo pending edit"
        );
        undone
    }

    /// Pending edits of a calendar, oldest first.
    pub fn pending(&self, calendar_id: &str) -> Vec<Mutation> {
        self.registry.lock().mutations(calendar_id)
    }

    /// Drop pending edits of one calendar, or of every calendar.
    pub fn clear(&self, calendar_id: Option<&str>) {
        self.registry.lock().clear(calendar_id);
    }

    /// Apply the edits currently registered for `calendar_id` to `events`.
    pub fn apply(&self, calendar_id: &str, events: Vec<Event>, window: &Period) -> Vec<Event> {
        // Snapshot first: expanding a series must not run under the lock
        let mutations = self.pending(calendar_id);
        if mutations.is_empty() {
            return events;
        }
        reconcile(events, &mutations, window)
    }

    pub(crate) fn in_flight(&self) -> &Arc<InFlightMap> {
        &self.in_flight
    }
}

//! Applying pending edits on top of a fetched event list.

use tracing::warn;

use crate::error::CalViewResult;
use crate::event::{CalendarItem, Event, SeriesEvent};
use crate::overlay::registry::{Mutation, MutationKind};
use crate::period::Period;

/// Days added on each side of the window before expanding a series, so
/// instances shifted over a day boundary by zone conversion are not missed.
const EXPANSION_PADDING_DAYS: u64 = 1;

/// Overlay `mutations` (oldest first) onto `events`, fetched for the
/// day-inclusive `window`.
pub fn reconcile(mut events: Vec<Event>, mutations: &[Mutation], window: &Period) -> Vec<Event> {
    for mutation in mutations {
        match (mutation.kind, &mutation.item) {
            (MutationKind::Delete, item) => {
                events.retain(|e| e.id != item.id());
            }
            (_, CalendarItem::Single(event)) => upsert(&mut events, event, window),
            (kind, CalendarItem::Recurring(series)) => {
                let instances = match instances_in_window(series, window) {
                    Ok(instances) => instances,
                    Err(e) => {
                        warn!(
                            event_id = %series.event.id,
                            error = %e,
                            "skipping pending edit, series could not be expanded"
                        );
                        continue;
                    }
                };

                if kind == MutationKind::Update {
                    events.retain(|e| e.uid != series.event.uid);
                }
                events.retain(|e| !instances.iter().any(|i| i.id == e.id));
                events.extend(instances);
            }
        }
    }

    events
}

/// An explicit edit always wins over what the source returned for the same
/// id; a new id only shows up when it falls inside the window.
fn upsert(events: &mut Vec<Event>, event: &Event, window: &Period) {
    let mut replaced = false;
    for existing in events.iter_mut().filter(|e| e.id == event.id) {
        *existing = event.clone();
        replaced = true;
    }

    if !replaced && window.intersects_days(&event.start, &event.end) {
        events.push(event.clone());
    }
}

fn instances_in_window(series: &SeriesEvent, window: &Period) -> CalViewResult<Vec<Event>> {
    let padded = window.padded(EXPANSION_PADDING_DAYS);
    let mut instances = series.expand(padded.start(), padded.end())?;
    instances.retain(|i| window.intersects_days(&i.start, &i.end));
    Ok(instances)
}

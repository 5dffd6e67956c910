//! Client-side read cache for calendar views.
//!
//! - `coverage`: which days of each calendar have already been fetched
//! - `store`: deduplicated events fetched so far, queried by time range
//! - `overlay`: wraps an event source, coalescing identical in-flight
//!   requests and applying pending local edits to what it returns
//! - `view`: drives the three together for a calendar UI

pub mod config;
pub mod coverage;
pub mod error;
pub mod event;
pub mod instant;
pub mod overlay;
pub mod period;
pub mod recurrence;
pub mod source;
pub mod store;
pub mod view;

pub use coverage::PeriodCoverageTracker;
pub use error::{CalViewError, CalViewResult};
pub use event::{CalendarItem, Event, SeriesEvent};
pub use instant::Instant;
pub use overlay::{Mutation, MutationKind, OverlayCache, UndoToken, WrappedSource};
pub use period::Period;
pub use recurrence::{Expand, RRuleExpansion};
pub use source::EventSource;
pub use store::EventStore;
pub use view::CalendarView;

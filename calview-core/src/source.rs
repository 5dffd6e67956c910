//! The fetch contract an overlay cache wraps.

use std::future::Future;

use crate::event::Event;
use crate::instant::Instant;

/// Lists the events of one calendar for a time window, usually by asking a
/// remote server.
///
/// `timezone` is passed through untouched; calview only uses it to tell
/// requests apart when coalescing them.
pub trait EventSource: Send + Sync {
    fn fetch(
        &self,
        start: Instant,
        end: Instant,
        timezone: Option<&str>,
    ) -> impl Future<Output = anyhow::Result<Vec<Event>>> + Send;
}

impl<F, Fut> EventSource for F
where
    F: Fn(Instant, Instant, Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<Event>>> + Send,
{
    fn fetch(
        &self,
        start: Instant,
        end: Instant,
        timezone: Option<&str>,
    ) -> impl Future<Output = anyhow::Result<Vec<Event>>> + Send {
        self(start, end, timezone.map(str::to_owned))
    }
}

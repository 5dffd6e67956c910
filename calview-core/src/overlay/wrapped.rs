//! A drop-in replacement for an event source that coalesces identical
//! requests and overlays pending edits on what it returns.

use std::sync::Arc;

use tracing::debug;

use crate::error::{CalViewError, CalViewResult};
use crate::event::Event;
use crate::instant::Instant;
use crate::overlay::OverlayCache;
use crate::overlay::in_flight::{self, Claim, FetchKey, Turn};
use crate::period::Period;
use crate::source::EventSource;

pub struct WrappedSource<S> {
    calendar_id: String,
    source: Arc<S>,
    cache: OverlayCache,
}

impl<S> Clone for WrappedSource<S> {
    fn clone(&self) -> Self {
        WrappedSource {
            calendar_id: self.calendar_id.clone(),
            source: Arc::clone(&self.source),
            cache: self.cache.clone(),
        }
    }
}

impl<S: EventSource> WrappedSource<S> {
    pub(crate) fn new(calendar_id: String, source: S, cache: OverlayCache) -> Self {
        WrappedSource {
            calendar_id,
            source: Arc::new(source),
            cache,
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn overlay(&self) -> &OverlayCache {
        &self.cache
    }

    /// Fetch the day-inclusive window `[start, end]` with the calendar's
    /// pending edits applied.
    ///
    /// Calls with the same window and timezone made while an underlying fetch
    /// is still running share its result. They resolve in the order they were
    /// made, and each one applies the edits registered at the moment it
    /// resolves.
    pub async fn fetch(
        &self,
        start: Instant,
        end: Instant,
        timezone: Option<&str>,
    ) -> CalViewResult<Vec<Event>> {
        let window = Period::new(start, end)?;
        let (base, mut turn) = self.fetch_base(self.key(&window, timezone)).await?;

        turn.wait().await;
        Ok(self.cache.apply(&self.calendar_id, base, &window))
    }

    /// Coalesced fetch of what the source holds, without pending edits.
    pub(crate) async fn fetch_unmodified(
        &self,
        window: &Period,
        timezone: Option<&str>,
    ) -> CalViewResult<Vec<Event>> {
        let (base, _) = self.fetch_base(self.key(window, timezone)).await?;
        Ok(base)
    }

    fn key(&self, window: &Period, timezone: Option<&str>) -> FetchKey {
        FetchKey {
            calendar_id: self.calendar_id.clone(),
            start: window.start(),
            end: window.end(),
            timezone: timezone.map(String::from),
        }
    }

    async fn fetch_base(&self, key: FetchKey) -> CalViewResult<(Vec<Event>, Turn)> {
        match in_flight::claim(self.cache.in_flight(), key.clone()) {
            Claim::Follower(delivery) => {
                debug!(
                    calendar_id = %key.calendar_id,
                    start = %key.start,
                    end = %key.end,
                    "joined in-flight fetch"
                );
                let (shared, turn) = delivery.await.map_err(|_| {
                    CalViewError::Source(Arc::new(anyhow::anyhow!(
                        "In-flight fetch for calendar '{}' was cancelled",
                        key.calendar_id
                    )))
                })?;
                let events = shared.map_err(CalViewError::Source)?;
                Ok((events, turn))
            }
            Claim::Leader(flight) => {
                // Let callers issued in the same turn find this flight before it lands
                tokio::task::yield_now().await;

                let result = self
                    .source
                    .fetch(key.start, key.end, key.timezone.as_deref())
                    .await
                    .map_err(Arc::new);

                let (turn, followers) = flight.complete(&result);
                debug!(
                    calendar_id = %key.calendar_id,
                    followers,
                    ok = result.is_ok(),
                    "fetched from event source"
                );

                let events = result.map_err(CalViewError::Source)?;
                Ok((events, turn))
            }
        }
    }
}

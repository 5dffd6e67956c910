//! Bookkeeping for fetches currently waiting on their event source.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::event::Event;
use crate::instant::Instant;

/// Outcome of one underlying fetch, shared by every caller that joined it.
pub(crate) type SharedFetch = Result<Vec<Event>, Arc<anyhow::Error>>;

/// Requests with equal keys are served by a single underlying fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FetchKey {
    pub calendar_id: String,
    pub start: Instant,
    pub end: Instant,
    pub timezone: Option<String>,
}

/// Handed to a follower once the leader's fetch lands.
pub(crate) type Delivery = (SharedFetch, Turn);

/// Callers waiting on a fetch someone else started, in arrival order.
pub(crate) type InFlightMap = Mutex<HashMap<FetchKey, Vec<oneshot::Sender<Delivery>>>>;

pub(crate) enum Claim {
    /// Nobody is fetching this key: the caller must do it.
    Leader(Flight),
    /// Someone already is: wait for their result.
    Follower(oneshot::Receiver<Delivery>),
}

pub(crate) fn claim(in_flight: &Arc<InFlightMap>, key: FetchKey) -> Claim {
    let mut pending = in_flight.lock();

    if let Some(waiters) = pending.get_mut(&key) {
        let (tx, rx) = oneshot::channel();
        waiters.push(tx);
        return Claim::Follower(rx);
    }

    pending.insert(key.clone(), Vec::new());
    Claim::Leader(Flight {
        in_flight: Arc::clone(in_flight),
        key: Some(key),
    })
}

/// A caller's place in the line of callers sharing one fetch.
///
/// `wait` returns once every earlier caller dropped its turn, so callers
/// finish in the order they called even when the executor polls them in
/// another order. A caller that goes away releases the next one.
pub(crate) struct Turn {
    previous: Option<oneshot::Receiver<()>>,
    _next: Option<oneshot::Sender<()>>,
}

impl Turn {
    pub async fn wait(&mut self) {
        if let Some(previous) = self.previous.as_mut() {
            // Sent or dropped, either way the earlier caller is done
            let _ = previous.await;
            self.previous = None;
        }
    }
}

/// Held by the leader while its fetch runs. Dropping it without completing
/// (the leader was cancelled) releases the key so followers see an error
/// instead of waiting forever.
pub(crate) struct Flight {
    in_flight: Arc<InFlightMap>,
    key: Option<FetchKey>,
}

impl Flight {
    /// Release the key and hand `result` to every follower, chaining their
    /// turns behind the leader's. Returns the leader's turn and the number
    /// of followers.
    pub fn complete(mut self, result: &SharedFetch) -> (Turn, usize) {
        let Some(key) = self.key.take() else {
            return (Turn { previous: None, _next: None }, 0);
        };

        let waiters = self.in_flight.lock().remove(&key).unwrap_or_default();
        let count = waiters.len();

        let (first, mut previous) = oneshot::channel();
        let leader = Turn { previous: None, _next: Some(first) };
        for waiter in waiters {
            let (next, following) = oneshot::channel();
            let turn = Turn {
                previous: Some(previous),
                _next: Some(next),
            };
            // A follower that went away drops its turn with the message
            let _ = waiter.send((result.clone(), turn));
            previous = following;
        }

        (leader, count)
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.in_flight.lock().remove(&key);
        }
    }
}

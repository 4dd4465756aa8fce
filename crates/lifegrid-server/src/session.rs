//! Registry of connected `WebSocket` sessions.
//!
//! Each session is represented by the sending half of a bounded queue. The
//! connection's writer task owns the receiving half and drains it to the
//! socket. Delivery is a non-blocking `try_send`: a closed queue (writer
//! gone) or a full queue (client too slow) removes the session on the spot,
//! and it is never retried.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

/// A serialized outbound text frame, cheap to clone across sessions.
pub type Frame = Utf8Bytes;

/// Unique identifier for one connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concurrency-safe set of live sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<SessionId, mpsc::Sender<Frame>>>,
    queue_capacity: usize,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions buffer up to
    /// `queue_capacity` frames each.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(BTreeMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new session and return its id and outbound queue.
    pub fn register(&self) -> (SessionId, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = SessionId::new();
        self.lock().insert(id, tx);
        (id, rx)
    }

    /// Remove a session. Returns `false` if it was already gone.
    pub fn deregister(&self, id: SessionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Whether the session is still registered.
    pub fn contains(&self, id: SessionId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Queue `frame` for one session.
    ///
    /// Returns `false` if the session is unknown or delivery failed, in
    /// which case it has been removed.
    pub fn deliver_to(&self, id: SessionId, frame: Frame) -> bool {
        let mut sessions = self.lock();
        let Some(tx) = sessions.get(&id) else {
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(e) => {
                log_failure(id, &e);
                sessions.remove(&id);
                false
            }
        }
    }

    /// Queue `frame` for every session, dropping the ones that fail.
    ///
    /// Returns the number of sessions the frame was queued for.
    pub fn deliver_all(&self, frame: &Frame) -> usize {
        let mut sessions = self.lock();
        let failed: Vec<SessionId> = sessions
            .iter()
            .filter_map(|(id, tx)| match tx.try_send(frame.clone()) {
                Ok(()) => None,
                Err(e) => {
                    log_failure(*id, &e);
                    Some(*id)
                }
            })
            .collect();
        for id in &failed {
            sessions.remove(id);
        }
        sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<SessionId, mpsc::Sender<Frame>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_failure(id: SessionId, error: &TrySendError<Frame>) {
    match error {
        TrySendError::Full(_) => warn!(session = %id, "Session queue full, dropping slow client"),
        TrySendError::Closed(_) => debug!(session = %id, "Session closed, dropping"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> Frame {
        Frame::from(text.to_owned())
    }

    #[test]
    fn register_and_deregister() {
        let registry = SessionRegistry::new(4);
        let (a, _rx_a) = registry.register();
        let (b, _rx_b) = registry.register();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.deregister(a));
        assert!(!registry.deregister(a));
        assert!(!registry.contains(a));
        assert!(registry.contains(b));
    }

    #[test]
    fn deliver_all_reaches_every_session() {
        let registry = SessionRegistry::new(4);
        let mut receivers: Vec<_> = (0..3).map(|_| registry.register().1).collect();

        assert_eq!(registry.deliver_all(&frame("hello")), 3);
        for rx in &mut receivers {
            assert_eq!(rx.try_recv().ok().as_ref().map(Utf8Bytes::as_str), Some("hello"));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn closed_session_is_dropped_and_never_retried() {
        let registry = SessionRegistry::new(4);
        let (_a, mut rx_a) = registry.register();
        let (b, rx_b) = registry.register();
        drop(rx_b);

        assert_eq!(registry.deliver_all(&frame("one")), 1);
        assert!(!registry.contains(b));
        assert_eq!(registry.deliver_all(&frame("two")), 1);
        assert_eq!(registry.len(), 1);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_a.try_recv().is_ok());
    }

    #[test]
    fn full_queue_drops_slow_session() {
        let registry = SessionRegistry::new(1);
        let (slow, _rx) = registry.register();

        assert_eq!(registry.deliver_all(&frame("first")), 1);
        assert_eq!(registry.deliver_all(&frame("second")), 0);
        assert!(!registry.contains(slow));
    }

    #[test]
    fn deliver_to_targets_one_session() {
        let registry = SessionRegistry::new(4);
        let (a, mut rx_a) = registry.register();
        let (_b, mut rx_b) = registry.register();

        assert!(registry.deliver_to(a, frame("only-a")));
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());

        assert!(!registry.deliver_to(SessionId::new(), frame("nobody")));
    }
}

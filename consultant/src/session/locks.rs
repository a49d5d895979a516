//! Per-session sequencing: at most one in-flight operation per session id.
//!
//! Entries live only while someone holds or waits for them, so the map stays bounded by
//! the number of sessions with work in flight.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Map of session id to its mutex. Holding the guard serializes message handling,
/// promotion, ending and reaping for that session.
#[derive(Default)]
pub struct SessionLocks {
    locks: Arc<LockMap>,
}

/// Held lock of one session. Dropping it unlocks and removes the map entry when no other
/// task holds or waits for it.
pub struct SessionGuard {
    guard: Option<OwnedMutexGuard<()>>,
    session_id: String,
    locks: Arc<LockMap>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // Unlock first so our own reference no longer counts.
        self.guard.take();
        self.locks
            .remove_if(&self.session_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and holds the lock of `session_id`.
    pub async fn lock(&self, session_id: &str) -> SessionGuard {
        let mutex = self
            .locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        SessionGuard {
            guard: Some(guard),
            session_id: session_id.to_string(),
            locks: self.locks.clone(),
        }
    }

    /// Number of sessions currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

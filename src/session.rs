//! Per-session result state.
//!
//! Each interactive session owns exactly one result slot: the most recent
//! successful prediction. The slot is explicit state on a [`SessionHandle`]
//! rather than ambient globals, and a [`SessionManager`] keeps sessions
//! isolated from each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, Semaphore};

use crate::types::StoredResult;

// ============================================================================
// SessionResultStore
// ============================================================================

/// Single-slot store for the most recent prediction result.
///
/// Last-write-wins, no history. Created empty; `clear()` returns it to
/// empty. Every failure path in the orchestration layer leaves the slot
/// untouched, so a prior result stays visible after a failed attempt.
#[derive(Debug, Default)]
pub struct SessionResultStore {
    slot: RwLock<Option<StoredResult>>,
}

impl SessionResultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current slot contents. Read-only; no side effects.
    pub async fn get(&self) -> Option<StoredResult> {
        self.slot.read().await.clone()
    }

    /// Replace the slot contents atomically.
    pub async fn set(&self, result: StoredResult) {
        *self.slot.write().await = Some(result);
    }

    /// Reset the slot to empty.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }
}

// ============================================================================
// SessionHandle
// ============================================================================

/// One session's state: the result slot, the single-in-flight prediction
/// permit, and the last-activity timestamp used by the idle reaper.
#[derive(Debug)]
pub struct SessionHandle {
    pub store: SessionResultStore,
    /// One permit per session. Held for the full duration of a
    /// collaborator call; a second predict attempt while it is out is
    /// rejected instead of queued.
    in_flight: Semaphore,
    last_active: RwLock<DateTime<Utc>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: SessionResultStore::new(),
            in_flight: Semaphore::new(1),
            last_active: RwLock::new(Utc::now()),
        }
    }

    /// Try to take the prediction permit. `None` means a prediction is
    /// already in flight for this session.
    pub fn try_begin_prediction(&self) -> Option<tokio::sync::SemaphorePermit<'_>> {
        self.in_flight.try_acquire().ok()
    }

    /// Whether a prediction is currently in flight.
    #[must_use]
    pub fn prediction_in_flight(&self) -> bool {
        self.in_flight.available_permits() == 0
    }

    pub async fn touch(&self) {
        *self.last_active.write().await = Utc::now();
    }

    pub async fn last_active(&self) -> DateTime<Utc> {
        *self.last_active.read().await
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SessionManager
// ============================================================================

/// Maps session ids to their handles. Sessions never share a slot; one
/// session's mutations are invisible to every other session.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh session with an empty store. Returns the new id.
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(SessionHandle::new()));
        id
    }

    /// Fetch the handle for `id`, creating a fresh empty session if the id
    /// is unknown. A new empty session is indistinguishable from session
    /// start, so an expired or never-seen id simply starts over.
    pub async fn get_or_create(&self, id: &str) -> Arc<SessionHandle> {
        if let Some(handle) = self.sessions.read().await.get(id) {
            handle.touch().await;
            return Arc::clone(handle);
        }
        let mut sessions = self.sessions.write().await;
        // Re-check under the write lock; another task may have raced us.
        let handle = sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(SessionHandle::new()));
        let handle = Arc::clone(handle);
        drop(sessions);
        handle.touch().await;
        handle
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `idle_ttl_secs`. A session with
    /// a prediction in flight is never evicted, regardless of age.
    ///
    /// Returns the number of sessions removed.
    pub async fn evict_idle(&self, idle_ttl_secs: u64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(idle_ttl_secs as i64);
        let mut expired = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (id, handle) in sessions.iter() {
                if handle.last_active().await < cutoff && !handle.prediction_in_flight() {
                    expired.push(id.clone());
                }
            }
        }
        if expired.is_empty() {
            return 0;
        }
        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for id in expired {
            // Re-check in-flight state; the prediction may have started
            // between the scan and this write lock.
            if let Some(handle) = sessions.get(&id) {
                if !handle.prediction_in_flight() {
                    sessions.remove(&id);
                    removed += 1;
                }
            }
        }
        removed
    }
}

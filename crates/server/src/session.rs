//! In-memory session registry
//!
//! Sessions are keyed by UUID. The registry itself is guarded by a
//! synchronous RwLock; each session's conversation state sits behind an
//! async mutex because a turn holds it across awaits (completion calls,
//! persistence). Idle sessions are swept by a background task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use intake_agent_core::SessionData;

/// One live conversation
pub struct SessionEntry {
    pub data: tokio::sync::Mutex<SessionData>,
    pub created_at: DateTime<Utc>,
    last_active: Mutex<Instant>,
}

impl SessionEntry {
    fn new(source_page: Option<String>) -> Self {
        let mut data = SessionData::new();
        data.source_page = source_page;
        Self {
            data: tokio::sync::Mutex::new(data),
            created_at: Utc::now(),
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.lock().elapsed()
    }
}

/// Registry of live sessions
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
    idle_after: Duration,
}

impl SessionRegistry {
    pub fn new(idle_after: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_after,
        }
    }

    /// Create a new session, returning its id and handle
    pub fn create(&self, source_page: Option<String>) -> (Uuid, Arc<SessionEntry>) {
        let id = Uuid::new_v4();
        let entry = Arc::new(SessionEntry::new(source_page));
        self.sessions.write().insert(id, entry.clone());
        tracing::debug!(session_id = %id, "session created");
        (id, entry)
    }

    /// Look up a session and mark it active
    pub fn get(&self, id: &Uuid) -> Option<Arc<SessionEntry>> {
        let entry = self.sessions.read().get(id).cloned();
        if let Some(ref e) = entry {
            e.touch();
        }
        entry
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop sessions idle past the configured threshold; returns how
    /// many were removed.
    pub fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.idle_for() < self.idle_after;
            if !keep {
                tracing::info!(session_id = %id, "sweeping idle session");
            }
            keep
        });
        before - sessions.len()
    }
}

/// Run the idle sweep on an interval until the server shuts down
pub fn spawn_idle_sweeper(
    registry: Arc<SessionRegistry>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let swept = registry.sweep_idle();
            if swept > 0 {
                tracing::info!(swept, remaining = registry.len(), "idle sweep");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_remove() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let (id, _) = registry.create(Some("/pricing".to_string()));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id).is_some());
        assert!(registry.get(&Uuid::new_v4()).is_none());
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_source_page_lands_on_session() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let (_, entry) = registry.create(Some("/get-started".to_string()));
        let data = entry.data.blocking_lock();
        assert_eq!(data.source_page.as_deref(), Some("/get-started"));
    }

    #[test]
    fn test_sweep_removes_only_idle() {
        let registry = SessionRegistry::new(Duration::ZERO);
        registry.create(None);
        registry.create(None);
        assert_eq!(registry.sweep_idle(), 2);
        assert!(registry.is_empty());

        let registry = SessionRegistry::new(Duration::from_secs(3600));
        let (id, _) = registry.create(None);
        assert_eq!(registry.sweep_idle(), 0);
        assert!(registry.get(&id).is_some());
    }
}

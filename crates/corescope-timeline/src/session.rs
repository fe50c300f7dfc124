//! Per-session timelines. Thread-safe for concurrent access.
//!
//! Each session key owns one [`Timeline`]. Access to a single timeline is
//! serialized by its mutex; different sessions never contend.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::timeline::Timeline;

#[derive(Debug)]
pub struct Session {
    timeline: Timeline,
    created_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
}

impl Session {
    fn new(timeline: Timeline) -> Self {
        let now = Utc::now();
        Session {
            timeline,
            created_at: now,
            last_access: now,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutable access; counts as activity for idle eviction.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        self.last_access = Utc::now();
        &mut self.timeline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_access(&self) -> DateTime<Utc> {
        self.last_access
    }

    fn touch(&mut self) {
        self.last_access = Utc::now();
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Mark a lookup as activity. A session already locked by its holder is in
/// use; the lock is not waited on, since parking_lot mutexes are not
/// reentrant.
fn touch(session: &SharedSession) {
    if let Some(mut guard) = session.try_lock() {
        guard.touch();
    }
}

/// Session key → timeline.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SharedSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            sessions: DashMap::new(),
        }
    }

    /// Existing session for `key`, or a fresh empty timeline.
    pub fn get_or_create(&self, key: &str) -> SharedSession {
        let session = self
            .sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating session {}", key);
                Arc::new(Mutex::new(Session::new(Timeline::new())))
            })
            .value()
            .clone();
        touch(&session);
        session
    }

    pub fn get(&self, key: &str) -> Option<SharedSession> {
        let session = self.sessions.get(key).map(|r| r.value().clone())?;
        touch(&session);
        Some(session)
    }

    /// Replace the session's timeline with `timeline`, e.g. after loading a
    /// new graph.
    pub fn reset(&self, key: &str, timeline: Timeline) -> SharedSession {
        let session = Arc::new(Mutex::new(Session::new(timeline)));
        self.sessions.insert(key.to_string(), Arc::clone(&session));
        tracing::debug!("Reset session {}", key);
        session
    }

    pub fn remove(&self, key: &str) -> bool {
        self.sessions.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`. Sessions currently
    /// locked by a caller are in use and kept. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| match session.try_lock() {
            Some(guard) => guard.last_access >= cutoff,
            None => true,
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::Action;

    #[test]
    fn sessions_are_isolated() {
        let registry = SessionRegistry::new();
        registry
            .get_or_create("a")
            .lock()
            .timeline_mut()
            .add_change(Action::Add, 1, 2)
            .unwrap();
        let b = registry.get_or_create("b");
        assert!(b.lock().timeline().current_edges().is_empty());
        assert_eq!(registry.len(), 2);

        let a = registry.get("a").unwrap();
        assert_eq!(a.lock().timeline().graph().edge_count(), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn reset_and_remove() {
        let registry = SessionRegistry::new();
        registry
            .get_or_create("s")
            .lock()
            .timeline_mut()
            .add_change(Action::Add, 1, 2)
            .unwrap();
        registry.reset("s", Timeline::new());
        assert_eq!(registry.get("s").unwrap().lock().timeline().tree().len(), 1);

        assert!(registry.remove("s"));
        assert!(!registry.remove("s"));
        assert!(registry.is_empty());
    }

    #[test]
    fn lookup_while_holding_the_session() {
        let registry = SessionRegistry::new();
        let session = registry.get_or_create("s");
        let mut guard = session.lock();
        guard.timeline_mut().add_change(Action::Add, 1, 2).unwrap();

        let again = registry.get("s").unwrap();
        assert!(Arc::ptr_eq(&session, &again));
        assert!(Arc::ptr_eq(&session, &registry.get_or_create("s")));
        drop(guard);
        assert_eq!(again.lock().timeline().graph().edge_count(), 1);
    }

    #[test]
    fn evicts_only_idle_sessions() {
        let registry = SessionRegistry::new();
        registry.get_or_create("old");
        registry.get_or_create("busy");

        // Everything is idle with a negative window; the locked one is kept.
        let busy = registry.get("busy").unwrap();
        let _guard = busy.lock();
        assert_eq!(registry.evict_idle(Duration::seconds(-1)), 1);
        assert!(registry.get("old").is_none());
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.evict_idle(Duration::hours(1)), 0);
    }
}

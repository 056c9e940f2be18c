//! Server-side session storage.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

use crate::observability::metrics;

/// Key read by the session gate.
pub const AUTHENTICATED: &str = "authenticated";

/// A small key-value record bound to one client token.
#[derive(Debug, Clone)]
pub struct Session {
    values: HashMap<String, Value>,
    expires_at: Instant,
}

impl Session {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// `authenticated` must be exactly `true`; anything else reads as false.
    pub fn is_authenticated(&self) -> bool {
        self.get(AUTHENTICATED).and_then(Value::as_bool).unwrap_or(false)
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A thread-safe session table keyed by opaque token.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Start a session holding `values` and return its token.
    pub fn create(&self, values: impl IntoIterator<Item = (String, Value)>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let session = Session {
            values: values.into_iter().collect(),
            expires_at: Instant::now() + self.ttl,
        };
        self.inner.insert(token.clone(), session);
        metrics::record_active_sessions(self.inner.len());
        token
    }

    /// Live session for `token`. Expired sessions are evicted and read as absent.
    pub fn get(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        let session = self.inner.get(token).map(|r| r.value().clone())?;
        if session.is_expired(now) {
            self.inner.remove_if(token, |_, s| s.is_expired(now));
            return None;
        }
        Some(session)
    }

    /// Drop a session. Returns whether it existed.
    pub fn destroy(&self, token: &str) -> bool {
        let removed = self.inner.remove(token).is_some();
        metrics::record_active_sessions(self.inner.len());
        removed
    }

    /// Remove every expired session, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, session| !session.is_expired(now));
        let after = self.inner.len();
        metrics::record_active_sessions(after);
        before.saturating_sub(after)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sweep expired sessions every `interval` until shutdown.
    pub async fn run_purge(self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = self.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining = self.len(), "Purged expired sessions");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session purge received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn authenticated() -> Vec<(String, Value)> {
        vec![(AUTHENTICATED.to_string(), json!(true))]
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(authenticated());

        let session = store.get(&token).unwrap();
        assert!(session.is_authenticated());

        assert!(store.destroy(&token));
        assert!(store.get(&token).is_none());
        assert!(!store.destroy(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create(Vec::new());
        let b = store.create(Vec::new());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_non_boolean_flag_is_not_authenticated() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(vec![(AUTHENTICATED.to_string(), json!("true"))]);
        assert!(!store.get(&token).unwrap().is_authenticated());

        let token = store.create(Vec::new());
        assert!(!store.get(&token).unwrap().is_authenticated());
    }

    #[test]
    fn test_expired_sessions_read_as_absent() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.create(authenticated());
        assert!(store.get(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let expired = SessionStore::new(Duration::ZERO);
        expired.create(authenticated());
        expired.create(authenticated());
        assert_eq!(expired.purge_expired(), 2);
        assert!(expired.is_empty());

        let live = SessionStore::new(Duration::from_secs(60));
        live.create(authenticated());
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_task_stops_on_shutdown() {
        let store = SessionStore::new(Duration::ZERO);
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(store.clone().run_purge(Duration::from_millis(10), rx));

        store.create(authenticated());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.is_empty());

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}

//! Process-wide session cache.
//!
//! Replaces ambient "is authenticated" state with an explicit value object:
//! `store` on sign-in, `clear` on logout, and `load` applies the staleness
//! policy (an expired session is cleared and never returned).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One cached session, valid until `expires_at`.
#[derive(Debug, Clone, Serialize)]
pub struct CachedSession {
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedSession {
    pub fn new(user_id: String, username: String, access_token: String, expires_in: u64) -> Self {
        Self {
            user_id,
            username,
            access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in as i64),
        }
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Default)]
pub struct SessionCache {
    current: Option<CachedSession>,
}

/// Session state as reported to API consumers. The access token stays inside
/// the cache.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

impl SessionCache {
    /// Current session, or None. A session past its expiry is cleared here
    /// rather than handed out stale.
    pub fn load(&mut self) -> Option<&CachedSession> {
        if let Some(ref session) = self.current {
            if session.is_stale(Utc::now()) {
                tracing::debug!(username = %session.username, "Cached session expired, clearing");
                self.current = None;
            }
        }
        self.current.as_ref()
    }

    pub fn store(&mut self, session: CachedSession) {
        self.current = Some(session);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn state(&mut self) -> SessionState {
        match self.load() {
            Some(session) => SessionState {
                is_authenticated: true,
                username: Some(session.username.clone()),
            },
            None => SessionState {
                is_authenticated: false,
                username: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in: i64) -> CachedSession {
        CachedSession {
            user_id: "u1".into(),
            username: "sari".into(),
            access_token: "tok".into(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    #[test]
    fn test_store_load_clear() {
        let mut cache = SessionCache::default();
        assert!(cache.load().is_none());

        cache.store(session(3600));
        assert_eq!(cache.load().unwrap().username, "sari");
        assert!(cache.state().is_authenticated);

        cache.clear();
        assert!(cache.load().is_none());
        assert!(!cache.state().is_authenticated);
    }

    #[test]
    fn test_expired_session_is_cleared_on_load() {
        let mut cache = SessionCache::default();
        cache.store(session(-5));

        assert!(cache.load().is_none());
        // The stale entry is gone, not just hidden
        assert!(cache.current.is_none());
    }

    #[test]
    fn test_state_does_not_expose_token() {
        let state = serde_json::to_value(SessionState {
            is_authenticated: true,
            username: Some("sari".into()),
        })
        .unwrap();
        assert!(state.get("access_token").is_none());

        let cached = serde_json::to_value(session(60)).unwrap();
        assert!(cached.get("access_token").is_none());
    }
}

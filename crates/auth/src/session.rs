//! Server-side session registry.
//!
//! Tokens carry a session id; a token is only honoured while its session is
//! active here. Logout revokes the session, which invalidates the token
//! before its `exp`.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use airhouse_core::UserId;

/// Identity of one login session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub opened_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-process registry of active sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `user_id` lasting `ttl`.
    ///
    /// An expiry past the representable range is capped at the maximum
    /// timestamp.
    pub fn open(&self, user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Session {
        let session = Session {
            id: SessionId::new(),
            user_id,
            opened_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        match self.sessions.write() {
            Ok(mut map) => {
                map.insert(session.id, session.clone());
            }
            Err(_) => warn!(session_id = %session.id, "session registry lock poisoned; session not recorded"),
        }
        session
    }

    /// True when `id` is registered for `user_id` and has not expired.
    pub fn is_active(&self, id: SessionId, user_id: UserId, now: DateTime<Utc>) -> bool {
        self.sessions
            .read()
            .ok()
            .and_then(|map| map.get(&id).map(|s| s.user_id == user_id && s.is_live(now)))
            .unwrap_or(false)
    }

    /// Revoke a session. Returns whether it was registered.
    pub fn revoke(&self, id: SessionId) -> bool {
        self.sessions
            .write()
            .map(|mut map| map.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Drop expired sessions; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        match self.sessions.write() {
            Ok(mut map) => {
                let before = map.len();
                map.retain(|_, s| s.is_live(now));
                let purged = before - map.len();
                if purged > 0 {
                    debug!(purged, remaining = map.len(), "purged expired sessions");
                }
                purged
            }
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opened_session_is_active_until_revoked() {
        let registry = SessionRegistry::new();
        let user = UserId::new();
        let now = Utc::now();
        let session = registry.open(user, now, Duration::minutes(30));

        assert!(registry.is_active(session.id, user, now));
        assert!(registry.revoke(session.id));
        assert!(!registry.is_active(session.id, user, now));
        assert!(!registry.revoke(session.id));
    }

    #[test]
    fn huge_ttl_caps_expiry_instead_of_overflowing() {
        let registry = SessionRegistry::new();
        let user = UserId::new();
        let now = Utc::now();
        let session = registry.open(user, now, Duration::MAX);

        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(registry.is_active(session.id, user, now));
    }

    #[test]
    fn session_is_bound_to_its_user() {
        let registry = SessionRegistry::new();
        let now = Utc::now();
        let session = registry.open(UserId::new(), now, Duration::minutes(30));
        assert!(!registry.is_active(session.id, UserId::new(), now));
    }

    #[test]
    fn expired_sessions_are_inactive_and_purged() {
        let registry = SessionRegistry::new();
        let user = UserId::new();
        let now = Utc::now();
        let short = registry.open(user, now, Duration::minutes(1));
        let long = registry.open(user, now, Duration::hours(1));

        let later = now + Duration::minutes(5);
        assert!(!registry.is_active(short.id, user, later));
        assert_eq!(registry.purge_expired(later), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_active(long.id, user, later));
    }
}

//! Session persistence for the cart and the signed-in identity.
//!
//! Both pieces of per-request mutable state (the cart and who is logged
//! in) live in one [`SessionData`] payload keyed by an opaque
//! [`SessionId`]. A missing or expired session simply yields the default
//! payload: an empty cart and an anonymous identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dragonfruit_core::{RoleSet, UserId};

use crate::db::RepositoryError;
use crate::models::{Cart, User};

/// How long a session stays valid after its last write.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Opaque session identifier, carried by the caller (e.g. in a cookie).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random session ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The signed-in identity stored in the session at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub roles: RoleSet,
}

/// Everything a session persists between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// The session cart; never outlives the session.
    pub cart: Cart,
    /// The signed-in user, if any.
    pub identity: Option<SessionIdentity>,
}

impl SessionData {
    /// Record a successful login.
    pub fn login(&mut self, user: &User) {
        self.identity = Some(SessionIdentity {
            user_id: user.id,
            roles: user.roles.clone(),
        });
    }

    /// Destroy the session contents: identity and cart both go.
    pub fn logout(&mut self) {
        *self = Self::default();
    }
}

/// Pluggable session persistence.
pub trait SessionStore {
    /// Load a session payload; `None` when absent or expired.
    async fn load(&self, id: SessionId) -> Result<Option<SessionData>, RepositoryError>;

    /// Persist a session payload, refreshing its expiry.
    async fn save(&self, id: SessionId, data: &SessionData) -> Result<(), RepositoryError>;

    /// Drop a session entirely.
    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError>;
}

/// In-memory session store for tests.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, SessionData>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionData>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, id: SessionId) -> Result<Option<SessionData>, RepositoryError> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn save(&self, id: SessionId, data: &SessionData) -> Result<(), RepositoryError> {
        self.lock().insert(id, data.clone());
        Ok(())
    }

    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError> {
        self.lock().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dragonfruit_core::ProductId;

    #[tokio::test]
    async fn test_missing_session_loads_as_none() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load(SessionId::generate()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_and_reload_roundtrip() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();

        let mut data = SessionData::default();
        data.cart.put(ProductId::new(1), 2);
        store.save(id, &data).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn test_delete_then_load_yields_fresh_default() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        let mut data = SessionData::default();
        data.cart.put(ProductId::new(1), 1);
        store.save(id, &data).await.unwrap();

        store.delete(id).await.unwrap();
        let loaded = store.load(id).await.unwrap().unwrap_or_default();
        assert!(loaded.cart.is_empty());
        assert!(loaded.identity.is_none());
    }

    #[test]
    fn test_logout_clears_cart_too() {
        let mut data = SessionData::default();
        data.cart.put(ProductId::new(1), 1);
        data.identity = Some(SessionIdentity {
            user_id: UserId::new(1),
            roles: RoleSet::user(),
        });
        data.logout();
        assert_eq!(data, SessionData::default());
    }
}

//! User domain types.

use chrono::{DateTime, Utc};

use dragonfruit_core::{Email, RoleSet, UserId};

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Opaque password hash; verification is delegated to a
    /// [`crate::auth::CredentialVerifier`].
    pub password_hash: String,
    /// Roles held by this user.
    pub roles: RoleSet,
    /// Deactivated users cannot authenticate.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

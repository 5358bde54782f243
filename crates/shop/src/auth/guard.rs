//! Authorization guard.
//!
//! Pure allow/deny decisions with no side effects. Callers translate the
//! two failure kinds into their transport's responses (redirect-to-login
//! for [`AccessError::Unauthenticated`], access-denied for
//! [`AccessError::Forbidden`]). The messages deliberately carry no
//! resource detail, so a denied order view reveals nothing about the
//! order's existence or owner.

use thiserror::Error;

use dragonfruit_core::{Role, UserId};

use super::AuthContext;

/// Why access was denied.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The caller is not signed in.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller is signed in but not allowed.
    #[error("access denied")]
    Forbidden,
}

/// Require a signed-in caller; returns their user ID.
///
/// # Errors
///
/// [`AccessError::Unauthenticated`] when the context is anonymous.
pub fn require_authenticated(ctx: &AuthContext) -> Result<UserId, AccessError> {
    ctx.user_id().ok_or(AccessError::Unauthenticated)
}

/// Require a signed-in caller holding `role`.
///
/// # Errors
///
/// [`AccessError::Unauthenticated`] when anonymous,
/// [`AccessError::Forbidden`] when the role is missing.
pub fn require_role(ctx: &AuthContext, role: Role) -> Result<UserId, AccessError> {
    let user_id = require_authenticated(ctx)?;
    if ctx.has_role(role) {
        Ok(user_id)
    } else {
        Err(AccessError::Forbidden)
    }
}

/// Require that the caller owns the resource or holds `role`.
///
/// A resource with no owner (guest checkout) admits only the role. The
/// owner-check compares the caller's user ID against `owner`.
///
/// # Errors
///
/// [`AccessError::Unauthenticated`] when anonymous,
/// [`AccessError::Forbidden`] when neither owner nor role matches.
pub fn require_owner_or_role(
    ctx: &AuthContext,
    owner: Option<UserId>,
    role: Role,
) -> Result<(), AccessError> {
    let user_id = require_authenticated(ctx)?;
    if owner == Some(user_id) || ctx.has_role(role) {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dragonfruit_core::RoleSet;

    fn customer(id: i32) -> AuthContext {
        AuthContext::user(UserId::new(id), RoleSet::user())
    }

    fn admin(id: i32) -> AuthContext {
        AuthContext::user(UserId::new(id), RoleSet::admin())
    }

    #[test]
    fn test_require_authenticated() {
        assert_eq!(
            require_authenticated(&AuthContext::anonymous()),
            Err(AccessError::Unauthenticated)
        );
        assert_eq!(require_authenticated(&customer(4)), Ok(UserId::new(4)));
    }

    #[test]
    fn test_require_role_implies_authentication() {
        assert_eq!(
            require_role(&AuthContext::anonymous(), Role::Admin),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn test_require_role_denies_missing_role() {
        assert_eq!(
            require_role(&customer(4), Role::Admin),
            Err(AccessError::Forbidden)
        );
        assert!(require_role(&admin(4), Role::Admin).is_ok());
    }

    #[test]
    fn test_owner_check_matrix() {
        let owner = Some(UserId::new(1));

        // Owner passes, other customer is forbidden, admin bypasses.
        assert!(require_owner_or_role(&customer(1), owner, Role::Admin).is_ok());
        assert_eq!(
            require_owner_or_role(&customer(2), owner, Role::Admin),
            Err(AccessError::Forbidden)
        );
        assert!(require_owner_or_role(&admin(2), owner, Role::Admin).is_ok());
        assert_eq!(
            require_owner_or_role(&AuthContext::anonymous(), owner, Role::Admin),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn test_guest_resource_admits_only_role() {
        // No owner on record: a signed-in customer is still forbidden.
        assert_eq!(
            require_owner_or_role(&customer(1), None, Role::Admin),
            Err(AccessError::Forbidden)
        );
        assert!(require_owner_or_role(&admin(1), None, Role::Admin).is_ok());
    }
}

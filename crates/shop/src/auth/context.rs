//! The calling identity for one request.

use dragonfruit_core::{Role, RoleSet, UserId};

use crate::session::SessionData;

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No one is signed in.
    Anonymous,
    /// A signed-in user with their role set.
    User { id: UserId, roles: RoleSet },
}

/// Request-scoped authorization context.
///
/// Ephemeral: built from the session at the start of a request and
/// dropped at the end. Holds no storage handles and performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    identity: Identity,
}

impl AuthContext {
    /// An anonymous context.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
        }
    }

    /// A context for a signed-in user.
    #[must_use]
    pub const fn user(id: UserId, roles: RoleSet) -> Self {
        Self {
            identity: Identity::User { id, roles },
        }
    }

    /// Build the context for a request from its session. A session with
    /// no stored identity yields an anonymous context.
    #[must_use]
    pub fn from_session(session: &SessionData) -> Self {
        session.identity.as_ref().map_or_else(Self::anonymous, |id| {
            Self::user(id.user_id, id.roles.clone())
        })
    }

    /// The signed-in user's ID, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match &self.identity {
            Identity::Anonymous => None,
            Identity::User { id, .. } => Some(*id),
        }
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.identity, Identity::User { .. })
    }

    /// Whether the signed-in user holds `role`. Always false when
    /// anonymous.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        match &self.identity {
            Identity::Anonymous => false,
            Identity::User { roles, .. } => roles.contains(role),
        }
    }
}

//! User roles and role sets.
//!
//! Roles are a closed enum rather than free-form strings: an unknown role
//! name fails at parse time instead of silently granting nothing.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a recognized role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0:?}")]
pub struct RoleError(pub String);

/// A permission tier a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary authenticated customer.
    User,
    /// Store administrator: order and catalog mutations.
    Admin,
}

impl Role {
    /// The wire/database representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(RoleError(other.to_owned())),
        }
    }
}

/// The set of roles held by a user.
///
/// Every authenticated user holds at least [`Role::User`]; construction
/// enforces that baseline so an empty role set cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    /// A plain customer role set.
    #[must_use]
    pub fn user() -> Self {
        Self(vec![Role::User])
    }

    /// An administrator role set (admins are customers too).
    #[must_use]
    pub fn admin() -> Self {
        Self(vec![Role::User, Role::Admin])
    }

    /// Whether the set contains `role`.
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Add a role; duplicates are ignored.
    pub fn insert(&mut self, role: Role) {
        if !self.contains(role) {
            self.0.push(role);
            self.0.sort_unstable();
        }
    }

    /// Iterate over the roles in the set.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        Self::user()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::user();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_set_is_not_admin() {
        let set = RoleSet::user();
        assert!(set.contains(Role::User));
        assert!(!set.contains(Role::Admin));
    }

    #[test]
    fn test_admin_set_contains_both() {
        let set = RoleSet::admin();
        assert!(set.contains(Role::User));
        assert!(set.contains(Role::Admin));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = RoleSet::user();
        set.insert(Role::Admin);
        set.insert(Role::Admin);
        assert_eq!(set, RoleSet::admin());
    }

    #[test]
    fn test_from_iter_always_includes_user() {
        let set: RoleSet = [Role::Admin].into_iter().collect();
        assert!(set.contains(Role::User));
    }
}

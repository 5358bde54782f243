//! Request identity and the authorization guard.
//!
//! [`AuthContext`] is rebuilt per request from session state and passed
//! into service calls; nothing here is ambient or global. The guard
//! functions in [`guard`] are the sole gate protecting order reads and
//! admin mutations.

pub mod context;
pub mod guard;
pub mod service;

pub use context::{AuthContext, Identity};
pub use guard::{AccessError, require_authenticated, require_owner_or_role, require_role};
pub use service::{AuthError, CredentialVerifier, authenticate};

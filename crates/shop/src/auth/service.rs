//! Authentication: the pass/fail login contract.
//!
//! Password hashing itself is a collaborator concern behind
//! [`CredentialVerifier`]; this module only decides whether a login
//! attempt succeeds, without revealing which check failed.

use thiserror::Error;

use dragonfruit_core::Email;

use crate::db::RepositoryError;
use crate::models::User;
use crate::store::UserStore;

/// Verifies a plaintext password against a stored hash.
///
/// Implemented by the host application with its hashing scheme of choice;
/// the pipeline only consumes the boolean outcome.
pub trait CredentialVerifier {
    /// Whether `password` matches `password_hash`.
    fn verify(&self, password: &str, password_hash: &str) -> bool;
}

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, inactive account, or wrong password. Deliberately
    /// one variant: callers must not learn which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Authenticate a user by email and password.
///
/// # Errors
///
/// [`AuthError::InvalidCredentials`] for any of: unknown email, inactive
/// account, failed verification. [`AuthError::Repository`] on storage
/// failure.
pub async fn authenticate<U: UserStore, V: CredentialVerifier>(
    users: &U,
    verifier: &V,
    email: &Email,
    password: &str,
) -> Result<User, AuthError> {
    let user = users
        .find_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.is_active {
        return Err(AuthError::InvalidCredentials);
    }

    if !verifier.verify(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use dragonfruit_core::RoleSet;

    /// Test verifier: the "hash" is the password reversed.
    struct ReversingVerifier;

    impl CredentialVerifier for ReversingVerifier {
        fn verify(&self, password: &str, password_hash: &str) -> bool {
            password.chars().rev().collect::<String>() == password_hash
        }
    }

    fn store_with_user(is_active: bool) -> (MemoryStore, Email) {
        let store = MemoryStore::new();
        let email = Email::parse("ada@example.com").unwrap();
        store.add_user(&email, "Ada", "terces", RoleSet::user(), is_active);
        (store, email)
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (store, email) = store_with_user(true);
        let user = authenticate(&store, &ReversingVerifier, &email, "secret")
            .await
            .unwrap();
        assert_eq!(user.email, email);
    }

    #[tokio::test]
    async fn test_wrong_password_fails() {
        let (store, email) = store_with_user(true);
        let err = authenticate(&store, &ReversingVerifier, &email, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_inactive_account_fails_even_with_right_password() {
        let (store, email) = store_with_user(false);
        let err = authenticate(&store, &ReversingVerifier, &email, "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_fails() {
        let store = MemoryStore::new();
        let email = Email::parse("nobody@example.com").unwrap();
        let err = authenticate(&store, &ReversingVerifier, &email, "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}

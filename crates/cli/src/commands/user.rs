//! User management commands.
//!
//! Password hashing happens outside this tool; `create` takes the hash
//! verbatim so the deployment can pick its own scheme.

use thiserror::Error;

use dragonfruit_core::{Email, EmailError, RoleSet};
use dragonfruit_shop::config::{ConfigError, ShopConfig};
use dragonfruit_shop::db::{self, RepositoryError, UserRepository};

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserCommandError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The email address is not valid.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// Repository error, including an already-taken email.
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new user with a pre-computed password hash.
///
/// # Errors
///
/// Returns an error if the email is invalid, configuration is missing,
/// or the email is already registered.
pub async fn create(
    email: &str,
    name: &str,
    password_hash: &str,
    admin: bool,
) -> Result<(), UserCommandError> {
    let email = Email::parse(email)?;
    let roles = if admin { RoleSet::admin() } else { RoleSet::user() };

    let config = ShopConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    let user = UserRepository::new(&pool)
        .create(&email, name, password_hash, &roles)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, admin, "user created");
    Ok(())
}

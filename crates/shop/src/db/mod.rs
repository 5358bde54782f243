//! Database operations for the shop `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `users` - Authentication and role membership
//! - `sessions` - Session payloads (cart + identity), JSONB with expiry
//! - `products` - Catalog with live stock counts
//! - `orders` - Orders with customer snapshot and status
//! - `order_items` - Per-order line snapshots (name/price frozen at
//!   purchase; `product_id` is a soft reference with no FK)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/shop/migrations/` and run via:
//! ```bash
//! cargo run -p dragonfruit-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod sessions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use sessions::PgSessionStore;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a domain count to the `INTEGER` columns used in the schema.
pub(crate) fn db_count(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("count out of range: {value}")))
}

/// Convert an `INTEGER` column back to a domain count.
pub(crate) fn domain_count(value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative count in database: {value}")))
}

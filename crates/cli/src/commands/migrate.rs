//! Database migration command.

use dragonfruit_shop::config::ShopConfig;
use dragonfruit_shop::db;

/// Apply pending migrations to the shop database.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShopConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running shop database migrations...");
    sqlx::migrate!("../shop/migrations").run(&pool).await?;
    tracing::info!("Shop migrations completed successfully");

    Ok(())
}

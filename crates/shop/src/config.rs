//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `SMTP_HOST` - Mail relay host (default: 127.0.0.1)
//! - `SMTP_PORT` - Mail relay port (default: 1025, a MailHog-style dev relay)
//! - `SMTP_USERNAME` - Relay username, if the relay requires auth
//! - `SMTP_PASSWORD` - Relay password
//! - `MAIL_FROM` - Sender address for order confirmations
//!   (default: orders@dragonfruit.example)
//! - `MAIL_FROM_NAME` - Sender display name (default: Dragonfruit Market)

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop application configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Outbound mail configuration
    pub smtp: SmtpConfig,
}

/// SMTP relay configuration for order confirmation mail.
#[derive(Clone)]
pub struct SmtpConfig {
    /// Relay hostname
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Relay username, if authentication is required
    pub username: Option<String>,
    /// Relay password
    pub password: Option<SecretString>,
    /// Sender address
    pub from_address: String,
    /// Sender display name
    pub from_name: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .finish()
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_database_url("SHOP_DATABASE_URL")?,
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = get_env_or_default("SMTP_PORT", "1025")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_owned(), e.to_string()))?;

        Ok(Self {
            host: get_env_or_default("SMTP_HOST", "127.0.0.1"),
            port,
            username: get_optional_env("SMTP_USERNAME"),
            password: get_optional_env("SMTP_PASSWORD").map(SecretString::from),
            from_address: get_env_or_default("MAIL_FROM", "orders@dragonfruit.example"),
            from_name: get_env_or_default("MAIL_FROM_NAME", "Dragonfruit Market"),
        })
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

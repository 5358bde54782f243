//! `PostgreSQL`-backed session store.
//!
//! Payloads are stored as JSONB with a sliding expiry; expired rows are
//! invisible to `load` and reaped opportunistically on save.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;
use crate::session::{SESSION_TTL_DAYS, SessionData, SessionId, SessionStore};

/// Session store persisting to the `sessions` table.
pub struct PgSessionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgSessionStore<'a> {
    /// Create a new session store.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn next_expiry() -> DateTime<Utc> {
        Utc::now() + Duration::days(SESSION_TTL_DAYS)
    }
}

impl SessionStore for PgSessionStore<'_> {
    async fn load(&self, id: SessionId) -> Result<Option<SessionData>, RepositoryError> {
        let row: Option<(Json<SessionData>,)> =
            sqlx::query_as("SELECT data FROM sessions WHERE id = $1 AND expires_at > now()")
                .bind(id.as_uuid())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(data,)| data.0))
    }

    async fn save(&self, id: SessionId, data: &SessionData) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sessions (id, data, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET data = $2, expires_at = $3",
        )
        .bind(id.as_uuid())
        .bind(Json(data))
        .bind(Self::next_expiry())
        .execute(self.pool)
        .await?;

        // Reap expired rows opportunistically.
        sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

//! Session store rows, keyed by `sid` and swept by `expire`.

use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;
use crate::models::Session;

/// Repository for the `session` table.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO "session" (sid, sess, expire)
            VALUES ($1, $2::json, $3)
            ON CONFLICT (sid) DO UPDATE SET sess = EXCLUDED.sess, expire = EXCLUDED.expire
            "#,
        )
        .bind(&session.sid)
        .bind(Json(&session.sess))
        .bind(session.expire)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, sid: &str) -> Result<Option<Session>, RepositoryError> {
        let row: Option<(String, Json<Value>, NaiveDateTime)> =
            sqlx::query_as(r#"SELECT sid, sess, expire FROM "session" WHERE sid = $1"#)
                .bind(sid)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(sid, Json(sess), expire)| Session { sid, sess, expire }))
    }

    /// Delete sessions that expired at or before `now`. Returns rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn prune_expired(&self, now: NaiveDateTime) -> Result<u64, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "session" WHERE expire <= $1"#)
            .bind(now)
            .execute(self.pool)
            .await?;

        let removed = result.rows_affected();
        tracing::info!(removed, "Expired sessions pruned");
        Ok(removed)
    }
}

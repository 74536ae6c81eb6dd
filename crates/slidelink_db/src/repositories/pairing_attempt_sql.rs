//! SQL implementation of the pairing attempt repository
//!
//! Stores pairing attempts in a single table keyed by code, reached through
//! SQLx's `Any` driver. The conditional claim operations are single
//! UPDATE/DELETE … RETURNING statements, so per-key atomicity comes from the
//! database rather than from application-level locking.
//!
//! Timestamps are stored as unix milliseconds in BIGINT columns;
//! `DateTime<Utc>` does not decode through the `Any` driver.

use crate::error::DbError;
use crate::repositories::pairing_attempt::{PairingAttempt, PairingAttemptRepository};
use crate::DbClient;
use chrono::{DateTime, Utc};
use slidelink_common::models::LinkedUser;
use slidelink_common::services::BoxFuture;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info, warn};

/// SQL implementation of the pairing attempt repository
#[derive(Debug, Clone)]
pub struct SqlPairingAttemptRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlPairingAttemptRepository {
    /// Create a new SQL pairing attempt repository.
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const ATTEMPT_COLUMNS: &str =
    "code, device_id, created_at_ms, expires_at_ms, linked, user_id, user_email";

fn row_to_attempt(row: &AnyRow) -> Result<PairingAttempt, DbError> {
    let created_at_ms: i64 = row
        .try_get("created_at_ms")
        .map_err(|e| DbError::QueryError(e.to_string()))?;
    let expires_at_ms: i64 = row
        .try_get("expires_at_ms")
        .map_err(|e| DbError::QueryError(e.to_string()))?;
    let linked: i64 = row
        .try_get("linked")
        .map_err(|e| DbError::QueryError(e.to_string()))?;

    let to_datetime = |ms: i64| {
        DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| DbError::QueryError(format!("timestamp out of range: {}", ms)))
    };

    let linked_user = if linked != 0 {
        Some(LinkedUser {
            user_id: row.try_get("user_id").unwrap_or_default(),
            user_email: row.try_get("user_email").unwrap_or_default(),
        })
    } else {
        None
    };

    Ok(PairingAttempt {
        code: row.try_get("code").unwrap_or_default(),
        device_id: row.try_get("device_id").unwrap_or_default(),
        created_at: to_datetime(created_at_ms)?,
        expires_at: to_datetime(expires_at_ms)?,
        linked_user,
    })
}

impl PairingAttemptRepository for SqlPairingAttemptRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing pairing attempt schema");

            // Create the pairing_attempts table if it doesn't exist.
            // The primary key on code is what backs insert-collision detection.
            let query = r#"
                CREATE TABLE IF NOT EXISTS pairing_attempts (
                    code TEXT PRIMARY KEY,
                    device_id TEXT NOT NULL,
                    created_at_ms BIGINT NOT NULL,
                    expires_at_ms BIGINT NOT NULL,
                    linked INTEGER NOT NULL DEFAULT 0,
                    user_id TEXT,
                    user_email TEXT
                )
            "#;

            self.db_client.execute(query).await?;

            info!("Pairing attempt schema initialized successfully");
            Ok(())
        })
    }

    fn insert<'a>(
        &'a self,
        attempt: PairingAttempt,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, bool, DbError> {
        Box::pin(async move {
            debug!("Inserting pairing attempt for device: {}", attempt.device_id);

            // Evict a dead occupant first so its code becomes reusable
            sqlx::query("DELETE FROM pairing_attempts WHERE code = $1 AND expires_at_ms <= $2")
                .bind(&attempt.code)
                .bind(now.timestamp_millis())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to evict expired pairing attempt: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            let query = r#"
                INSERT INTO pairing_attempts
                    (code, device_id, created_at_ms, expires_at_ms, linked, user_id, user_email)
                VALUES ($1, $2, $3, $4, 0, NULL, NULL)
            "#;

            let result = sqlx::query(query)
                .bind(&attempt.code)
                .bind(&attempt.device_id)
                .bind(attempt.created_at.timestamp_millis())
                .bind(attempt.expires_at.timestamp_millis())
                .execute(self.db_client.pool())
                .await;

            match result {
                Ok(_) => Ok(true),
                // The only database-level error this statement can raise
                // against the schema above is the primary-key violation:
                // a live attempt already holds this code.
                Err(sqlx::Error::Database(db_err)) => {
                    warn!("Pairing code collision: {}", db_err);
                    Ok(false)
                }
                Err(e) => {
                    error!("Failed to insert pairing attempt: {}", e);
                    Err(DbError::QueryError(e.to_string()))
                }
            }
        })
    }

    fn find_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
        Box::pin(async move {
            let query = format!(
                "SELECT {} FROM pairing_attempts WHERE code = $1",
                ATTEMPT_COLUMNS
            );

            let row = sqlx::query(&query)
                .bind(code)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find pairing attempt: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            row.as_ref().map(row_to_attempt).transpose()
        })
    }

    fn claim_link<'a>(
        &'a self,
        code: &'a str,
        user: LinkedUser,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
        Box::pin(async move {
            debug!("Linking pairing attempt for user: {}", user.user_id);

            // One conditional statement: link an unexpired, unlinked attempt,
            // or re-confirm one already linked to this same user.
            let query = format!(
                r#"
                UPDATE pairing_attempts
                SET linked = 1, user_id = $2, user_email = $3
                WHERE code = $1 AND expires_at_ms > $4 AND (linked = 0 OR user_id = $2)
                RETURNING {}
            "#,
                ATTEMPT_COLUMNS
            );

            let row = sqlx::query(&query)
                .bind(code)
                .bind(&user.user_id)
                .bind(&user.user_email)
                .bind(now.timestamp_millis())
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to link pairing attempt: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            row.as_ref().map(row_to_attempt).transpose()
        })
    }

    fn claim_exchange<'a>(
        &'a self,
        code: &'a str,
        device_id: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
        Box::pin(async move {
            // Conditional delete-returning: of N racing callers, the
            // database hands the row to exactly one.
            let query = format!(
                r#"
                DELETE FROM pairing_attempts
                WHERE code = $1 AND device_id = $2 AND linked = 1 AND expires_at_ms > $3
                RETURNING {}
            "#,
                ATTEMPT_COLUMNS
            );

            let row = sqlx::query(&query)
                .bind(code)
                .bind(device_id)
                .bind(now.timestamp_millis())
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to claim pairing attempt for exchange: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            row.as_ref().map(row_to_attempt).transpose()
        })
    }

    fn remove_expired<'a>(
        &'a self,
        code: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, bool, DbError> {
        Box::pin(async move {
            let result =
                sqlx::query("DELETE FROM pairing_attempts WHERE code = $1 AND expires_at_ms <= $2")
                    .bind(code)
                    .bind(now.timestamp_millis())
                    .execute(self.db_client.pool())
                    .await
                    .map_err(|e| {
                        error!("Failed to remove expired pairing attempt: {}", e);
                        DbError::QueryError(e.to_string())
                    })?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM pairing_attempts WHERE expires_at_ms <= $1")
                .bind(now.timestamp_millis())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to purge expired pairing attempts: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            let purged = result.rows_affected();
            if purged > 0 {
                debug!("Purged {} expired pairing attempts", purged);
            }
            Ok(purged)
        })
    }
}

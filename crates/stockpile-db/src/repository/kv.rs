//! # Local Key-Value Repository
//!
//! Whole-blob storage for the device's serialized snapshot and sync metadata.
//!
//! ```text
//! ┌────────────────────────────┬──────────────────────────────────────────┐
//! │ key                        │ value                                    │
//! ├────────────────────────────┼──────────────────────────────────────────┤
//! │ stockpile.snapshot         │ {"items":[...],"pins":[...],...}         │
//! │ stockpile.sync_meta        │ {"userId":"...","lastPush":"..."}        │
//! └────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! A `put` replaces the previous value outright; there is no merge at this
//! layer.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `local_kv` table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing local value");

        sqlx::query(
            r#"
            INSERT INTO local_kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes `key`. Returns true if a value was present.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM local_kv WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

//! # State Repository
//!
//! SQLite-backed [`StateStore`]: one row per record in `app_state`.
//!
//! ```text
//! ┌──────────────────────────┬─────────────────────────┬───────────────────┐
//! │ key                      │ value                   │ updated_at        │
//! ├──────────────────────────┼─────────────────────────┼───────────────────┤
//! │ shelf_counter_rows_v2    │ [{"ts":...}, ...]       │ 2024-01-02T03:... │
//! │ shelf_counter_prefs_v2   │ {"defaultLoc":...}      │ 2024-01-02T03:... │
//! └──────────────────────────┴─────────────────────────┴───────────────────┘
//! ```
//!
//! Saves are a single upsert, so a record is always either the old or the
//! new document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::store::StateStore;

/// A stored record with its last write time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StateRecord {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for the `app_state` table.
#[derive(Debug, Clone)]
pub struct StateRepository {
    pool: SqlitePool,
}

impl StateRepository {
    /// Creates a new StateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StateRepository { pool }
    }

    /// Fetches a record with its metadata.
    pub async fn get(&self, key: &str) -> DbResult<Option<StateRecord>> {
        let record = sqlx::query_as::<_, StateRecord>(
            "SELECT key, value, updated_at FROM app_state WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts or replaces a record.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = value.len(), "Saving state record");

        sqlx::query(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a record. Returns true if one existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM app_state WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists stored keys in order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM app_state ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

#[async_trait]
impl StateStore for StateRepository {
    async fn load(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.get(key).await?.map(|record| record.value))
    }

    async fn save(&self, key: &str, value: &str) -> DbResult<()> {
        self.put(key, value).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

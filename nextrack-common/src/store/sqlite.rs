//! SQLite-backed key-value store
//!
//! Scalars live in `kv_scalar`, ordered lists in `kv_list` with a
//! per-key monotonic sequence number. Batched operations run inside a
//! transaction so a reader never observes a half-applied batch (the
//! append without its trim, or half of a multi-key state write).

use super::KvStore;
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// sqlx/SQLite implementation of [`KvStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) a store at the given path.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePool::connect(&db_url).await?;
        let store = Self { pool };
        store.init_schema().await?;
        info!("Opened key-value store at {}", db_path.display());
        Ok(store)
    }

    /// Open a private in-memory store. Used by tests.
    ///
    /// Pinned to a single connection: every pooled connection would
    /// otherwise get its own empty in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_scalar (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_list (
                key   TEXT NOT NULL,
                seq   INTEGER NOT NULL,
                value INTEGER NOT NULL,
                PRIMARY KEY (key, seq)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT value FROM kv_scalar WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO kv_scalar (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, Vec<u8>)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query("INSERT OR REPLACE INTO kv_scalar (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value.as_slice())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_append_trim(&self, key: &str, value: i64, max_len: usize) -> Result<()> {
        let max_len = i64::try_from(max_len)
            .map_err(|_| Error::Internal(format!("list capacity out of range: {}", max_len)))?;

        let mut tx = self.pool.begin().await?;

        let next_seq: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(seq) + 1, 0) FROM kv_list WHERE key = ?")
                .bind(key)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("INSERT INTO kv_list (key, seq, value) VALUES (?, ?, ?)")
            .bind(key)
            .bind(next_seq)
            .bind(value)
            .execute(&mut *tx)
            .await?;

        // Keep the max_len highest sequence numbers
        sqlx::query("DELETE FROM kv_list WHERE key = ? AND seq <= ? - ?")
            .bind(key)
            .bind(next_seq)
            .bind(max_len)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_range(&self, key: &str) -> Result<Vec<i64>> {
        let values: Vec<i64> =
            sqlx::query_scalar("SELECT value FROM kv_list WHERE key = ? ORDER BY seq")
                .bind(key)
                .fetch_all(&self.pool)
                .await?;
        Ok(values)
    }
}

//! Key-value store abstraction
//!
//! The recommendation core talks to a remote associative store through the
//! `KvStore` trait: scalar get/set, batched multi-key writes, and bounded
//! ordered lists. Two backends ship: a SQLite-backed store for normal runs
//! and an in-memory store for tests and ephemeral deployments.

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Remote associative store boundary.
///
/// Batched operations (`set_many`, `list_append_trim`) are atomic as a
/// unit from the store's perspective: a concurrent reader never observes
/// a partially applied batch.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a scalar value, `None` if the key is unset.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a scalar value, overwriting any previous one.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Set several scalar values in one batched write.
    async fn set_many(&self, entries: &[(String, Vec<u8>)]) -> Result<()>;

    /// Append a value to an ordered list and trim the list to its most
    /// recent `max_len` entries, as one batched write. `max_len == 0`
    /// empties the list.
    async fn list_append_trim(&self, key: &str, value: i64, max_len: usize) -> Result<()>;

    /// Read the full contents of an ordered list, oldest first.
    async fn list_range(&self, key: &str) -> Result<Vec<i64>>;
}

/// One named model namespace inside a shared store.
///
/// Precomputed recommendation lists live under `<model>:<key>` where the
/// key is a user id or a track id depending on the model. Read-only from
/// the core's perspective; populated by ingestion.
#[derive(Clone)]
pub struct ModelStore {
    store: Arc<dyn KvStore>,
    name: String,
}

impl ModelStore {
    pub fn new(store: Arc<dyn KvStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// Model namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch the serialized recommendation list for `key`, if any.
    pub async fn get_raw(&self, key: i64) -> Result<Option<Vec<u8>>> {
        self.store.get(&format!("{}:{}", self.name, key)).await
    }

    /// Store a serialized recommendation list for `key` (ingestion path).
    pub async fn put_raw(&self, key: i64, value: &[u8]) -> Result<()> {
        self.store.set(&format!("{}:{}", self.name, key), value).await
    }

    /// Store several serialized lists in one batched write (ingestion path).
    pub async fn put_many(&self, entries: &[(i64, Vec<u8>)]) -> Result<()> {
        let prefixed: Vec<(String, Vec<u8>)> = entries
            .iter()
            .map(|(k, v)| (format!("{}:{}", self.name, k), v.clone()))
            .collect();
        self.store.set_many(&prefixed).await
    }
}

//! In-memory key-value store backend
//!
//! Used by tests and by ephemeral deployments that do not need the data
//! to survive a restart. Batches hold the write lock for their whole
//! duration, which gives them the same atomic-as-a-unit property the
//! SQLite backend gets from transactions.

use super::KvStore;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// HashMap-backed store. Cheap to create, nothing persisted.
#[derive(Default)]
pub struct MemoryStore {
    scalars: RwLock<HashMap<String, Vec<u8>>>,
    lists: RwLock<HashMap<String, Vec<i64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.scalars.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.scalars
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, Vec<u8>)]) -> Result<()> {
        let mut scalars = self.scalars.write().await;
        for (key, value) in entries {
            scalars.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn list_append_trim(&self, key: &str, value: i64, max_len: usize) -> Result<()> {
        let mut lists = self.lists.write().await;
        let list = lists.entry(key.to_string()).or_default();
        list.push(value);
        if list.len() > max_len {
            let excess = list.len() - max_len;
            list.drain(..excess);
        }
        Ok(())
    }

    async fn list_range(&self, key: &str) -> Result<Vec<i64>> {
        Ok(self.lists.read().await.get(key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scalar_roundtrip() {
        let store = MemoryStore::new();

        assert!(store.get("missing").await.unwrap().is_none());

        store.set("k", b"v1").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"v1");

        // Overwrite
        store.set("k", b"v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_set_many() {
        let store = MemoryStore::new();

        store
            .set_many(&[
                ("a".to_string(), b"1".to_vec()),
                ("b".to_string(), b"2".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(store.get("a").await.unwrap().unwrap(), b"1");
        assert_eq!(store.get("b").await.unwrap().unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_list_append_trim_bound() {
        let store = MemoryStore::new();

        for i in 0..10 {
            store.list_append_trim("l", i, 4).await.unwrap();
        }

        // Only the 4 most recent survive, oldest first
        assert_eq!(store.list_range("l").await.unwrap(), vec![6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn test_list_append_trim_zero_capacity() {
        let store = MemoryStore::new();

        store.list_append_trim("l", 1, 0).await.unwrap();
        assert!(store.list_range("l").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_range_missing_key() {
        let store = MemoryStore::new();
        assert!(store.list_range("nope").await.unwrap().is_empty());
    }
}

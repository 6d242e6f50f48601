//! In-memory durable store.
//!
//! Backs tests and demos; also a reasonable stand-in wherever durability
//! across restarts is not required.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use keeper_core::error::Result;
use keeper_core::storage::DurableStore;

/// A `DurableStore` holding entries in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryDurableStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys. Intended for assertions in tests.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemoryDurableStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", b"v1".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v1".to_vec()));

        store.set("k", b"v2".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v2".to_vec()));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_ok() {
        let store = InMemoryDurableStore::new();
        store.remove("never-set").await.unwrap();
        assert!(store.is_empty().await);
    }
}

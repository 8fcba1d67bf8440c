//! In-memory durable store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use queuedeck_core::result::AppResult;
use queuedeck_core::traits::DurableStore;

/// A purely in-memory [`DurableStore`].
///
/// Nothing survives a process restart; intended for tests and for
/// embedding hosts that persist state through their own channel.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value entries.
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

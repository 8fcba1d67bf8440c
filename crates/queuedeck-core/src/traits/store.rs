//! Durable key-value store trait for client state that must survive a
//! process restart.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for durable key-value backends (file-backed, in-memory, or an
/// OS keychain supplied by the embedding host).
///
/// All values are stored as strings (JSON for structured values). The
/// store is the side channel for session snapshots and credentials; it is
/// never the source of truth for in-process reads.
#[async_trait]
pub trait DurableStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any existing one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;
}

impl dyn DurableStore {
    /// Get a typed value by deserializing from JSON.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>> {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    pub async fn set_json<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }
}

//! File-backed durable store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use queuedeck_core::error::AppError;
use queuedeck_core::result::AppResult;
use queuedeck_core::traits::DurableStore;

/// A [`DurableStore`] that keeps each key in its own document under a
/// state directory.
///
/// Documents are written with owner-only permissions on Unix since the
/// credential keys pass through this store. Writes go through a temporary
/// file and rename so a crash mid-write never leaves a truncated document.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// State directory.
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&dir, perms).await?;
        }
        Ok(Self { dir })
    }

    /// Resolves the document path for a key, rejecting keys that would
    /// escape the state directory.
    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::storage(format!("Invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn write_atomic(path: &Path, value: &str) -> AppResult<()> {
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp, perms).await?;
        }
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        Self::write_atomic(&path, value).await?;
        debug!(key = %key, "Persisted state document");
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

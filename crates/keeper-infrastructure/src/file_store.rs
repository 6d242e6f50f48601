//! File-backed durable store.
//!
//! One file per logical key under a base directory:
//!
//! ```text
//! base_dir/
//! ├── user
//! └── <other-key>
//! ```
//!
//! Keys are used directly as filenames, so they must not contain path
//! separators; every operation validates the key before touching disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use keeper_core::error::{KeeperError, Result};
use keeper_core::storage::DurableStore;

/// A `DurableStore` persisting each key as a file.
pub struct FileDurableStore {
    base_dir: PathBuf,
}

impl FileDurableStore {
    /// Creates a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| KeeperError::io(format!("Failed to create base directory: {}", e)))?;
        Ok(Self { base_dir })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(KeeperError::validation(format!(
                "invalid storage key: '{}'",
                key
            )));
        }
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl DurableStore for FileDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeeperError::persistence(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.key_path(key)?;
        fs::write(&path, bytes).await.map_err(|e| {
            KeeperError::persistence(format!("Failed to write {:?}: {}", path, e))
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KeeperError::persistence(format!(
                "Failed to remove {:?}: {}",
                path, e
            ))),
        }
    }
}

//! Platform path resolution for Keeper's durable data.
//!
//! ```text
//! ~/.local/share/keeper/      # Linux
//! ~/Library/Application Support/keeper/   # macOS
//! %APPDATA%\keeper\           # Windows
//! └── state/                  # FileDurableStore base directory
//! ```

use std::path::PathBuf;

use keeper_core::error::{KeeperError, Result};

/// Unified path management for Keeper.
pub struct KeeperPaths;

impl KeeperPaths {
    /// Returns the keeper data directory for the platform.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("keeper"))
            .ok_or_else(|| KeeperError::io("Cannot find platform data directory"))
    }

    /// Returns the base directory for the file-backed durable store.
    pub fn state_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("state"))
    }
}

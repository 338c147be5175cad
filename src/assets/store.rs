//! Asset store trait and filesystem implementation

use crate::config::CollisionPolicy;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while fetching or storing an asset
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request for {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Asset '{0}' already exists")]
    Collision(String),

    #[error("Invalid asset name '{0}'")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Durable storage for downloaded assets
pub trait AssetStore: Send + Sync {
    /// Writes `bytes` under `filename`, returning where it was stored
    ///
    /// When this returns `Ok` the asset is durably on disk. Name collisions are
    /// resolved by the store's [`CollisionPolicy`].
    fn put(&self, filename: &str, bytes: &[u8]) -> AssetResult<PathBuf>;
}

/// Stores assets as files in a single directory
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
    policy: CollisionPolicy,
}

impl FsAssetStore {
    /// Opens the store, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>, policy: CollisionPolicy) -> AssetResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, policy })
    }

    /// The directory assets are written into
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for FsAssetStore {
    fn put(&self, filename: &str, bytes: &[u8]) -> AssetResult<PathBuf> {
        // Names come from sanitized page text; a separator or a dot name
        // could leave the directory.
        if filename.is_empty() || filename.contains('/') || filename == "." || filename == ".." {
            return Err(AssetError::InvalidName(filename.to_string()));
        }

        // The bytes go to a short-named temp file in the same directory and are
        // renamed into place, so a crash never leaves a truncated image under
        // the final name.
        let target = self.root.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        let persisted = match self.policy {
            CollisionPolicy::Overwrite => tmp.persist(&target),
            CollisionPolicy::Reject => tmp.persist_noclobber(&target),
        };

        match persisted {
            Ok(_) => Ok(target),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                Err(AssetError::Collision(filename.to_string()))
            }
            Err(e) => Err(e.error.into()),
        }
    }
}

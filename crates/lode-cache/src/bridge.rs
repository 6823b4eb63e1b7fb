//! Storage backends for the result cache.
//!
//! A bridge moves whole cache documents between the handle and wherever
//! the embedder keeps them. The handle never touches storage directly,
//! so hosts without a filesystem can supply their own backend.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use crate::file::CacheFile;

/// Error types for cache storage operations.
///
/// All of these are non-fatal to the embedding application: a cache
/// that cannot be read is treated as empty, and a cache that cannot be
/// written is simply not persisted this session.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// IO error.
    #[error("cache io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("cache serialization error: {0}")]
    Serialize(String),

    /// Deserialization error.
    #[error("cache deserialization error: {0}")]
    Deserialize(String),
}

/// Moves cache documents in and out of storage.
pub trait CacheBridge: Send {
    /// Read the stored document, if any. `Ok(None)` means cold start.
    fn read(&self) -> Result<Option<CacheFile>, CacheError>;

    /// Replace the stored document.
    fn write(&self, file: &CacheFile) -> Result<(), CacheError>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileBridge {
    path: PathBuf,
}

impl FileBridge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheBridge for FileBridge {
    fn read(&self) -> Result<Option<CacheFile>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let file = serde_json::from_str(&text)
            .map_err(|e| CacheError::Deserialize(e.to_string()))?;
        Ok(Some(file))
    }

    fn write(&self, file: &CacheFile) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string(file)
            .map_err(|e| CacheError::Serialize(e.to_string()))?;
        // Write-then-rename so a crash mid-write never leaves a
        // truncated document behind.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            warn!(path = %self.path.display(), error = %e, "cache rename failed");
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-memory backend for tests and cache-less hosts.
#[derive(Debug, Default)]
pub struct MemoryBridge {
    slot: Mutex<Option<CacheFile>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the stored document, if any.
    pub fn stored(&self) -> Option<CacheFile> {
        self.slot.lock().clone()
    }
}

impl CacheBridge for MemoryBridge {
    fn read(&self) -> Result<Option<CacheFile>, CacheError> {
        Ok(self.slot.lock().clone())
    }

    fn write(&self, file: &CacheFile) -> Result<(), CacheError> {
        *self.slot.lock() = Some(file.clone());
        Ok(())
    }
}

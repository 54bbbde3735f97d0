//! services/client/src/adapters/local.rs
//!
//! File-backed implementation of the `LocalStorageService` port: one JSON
//! file per key under a storage directory. This is the offline-first
//! persistence layer for the store snapshot and the shutdown fallback.

use readshelf_core::ports::{LocalStorageService, PortError, PortResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable key-value storage over a directory of files.
pub struct FileStorageAdapter {
    dir: PathBuf,
}

impl FileStorageAdapter {
    /// Creates the adapter, creating the storage directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Maps a key to its file path. Keys may contain characters that are
    /// unsafe in file names (user ids in particular), so everything outside
    /// a conservative set is replaced.
    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{sanitized}.json"))
    }
}

impl LocalStorageService for FileStorageAdapter {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        fs::write(self.path_for(key), value).map_err(|e| PortError::Unexpected(e.to_string()))
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

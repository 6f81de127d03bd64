//! Persistence layer for the entry and tag files.
//!
//! The store hands whole-collection JSON documents to a [`StorageBackend`]
//! keyed by file name. Two implementations ship:
//!
//! - [`FilesystemBackend`]: one file per key under a data directory, written
//!   through a temp file and a rename so a crash never leaves a torn file.
//! - [`MemoryBackend`]: a map in memory, for tests and dry runs.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use timeline_core::{Error, Result};
use tracing::{debug, warn};

/// Storage backend trait for the persisted collections.
///
/// Keys are plain file names (`entries.json`, `tags.json`).
pub trait StorageBackend: Send + Sync {
    /// Replace the data stored under `key`.
    fn write(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Read the data stored under `key`.
    ///
    /// Returns `Error::NotFound` when nothing was ever written.
    fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Human-readable location, for logs and the CLI.
    fn location(&self) -> String;
}

// =============================================================================
// FILESYSTEM
// =============================================================================

/// Filesystem storage backend rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a backend for `base_path`. The directory is created on first
    /// write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

impl StorageBackend for FilesystemBackend {
    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(key);
        debug!(
            subsystem = "store",
            component = "persistence",
            full_path = %full_path.display(),
            size = data.len(),
            "file write"
        );

        fs::create_dir_all(&self.base_path).map_err(|e| {
            warn!(
                subsystem = "store",
                component = "persistence",
                path = %self.base_path.display(),
                error = %e,
                "create_dir_all failed"
            );
            e
        })?;

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &full_path).map_err(|e| {
            warn!(
                subsystem = "store",
                component = "persistence",
                from = %temp_path.display(),
                to = %full_path.display(),
                error = %e,
                "rename failed"
            );
            e
        })?;

        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(key);
        match fs::read(&full_path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(full_path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self) -> String {
        self.base_path.display().to_string()
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with raw bytes, as if a previous run had written them.
    pub fn with_file(self, key: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), data.into());
        self
    }
}

impl StorageBackend for MemoryBackend {
    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// =============================================================================
// JSON HELPERS
// =============================================================================

/// Serialize `value` as pretty JSON and write it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    backend: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    backend.write(key, &data)
}

/// Read `key` and decode it as JSON.
pub fn load_json<T: DeserializeOwned>(backend: &dyn StorageBackend, key: &str) -> Result<T> {
    let data = backend.read(key)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filesystem_write_read() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path().join("nested"));

        backend.write("entries.json", b"[]").unwrap();

        assert_eq!(backend.read("entries.json").unwrap(), b"[]");
        assert!(dir.path().join("nested/entries.json").is_file());
        assert!(!dir.path().join("nested/entries.json.tmp").exists());
    }

    #[test]
    fn test_filesystem_overwrite() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("tags.json", b"first").unwrap();
        backend.write("tags.json", b"second").unwrap();

        assert_eq!(backend.read("tags.json").unwrap(), b"second");
    }

    #[test]
    fn test_filesystem_read_missing() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        assert!(matches!(
            backend.read("entries.json"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new().with_file("tags.json", "[]");
        assert_eq!(backend.read("tags.json").unwrap(), b"[]");
        assert!(matches!(backend.read("entries.json"), Err(Error::NotFound(_))));

        backend.write("entries.json", b"{}").unwrap();
        assert_eq!(backend.read("entries.json").unwrap(), b"{}");
        assert_eq!(backend.location(), "memory");
    }

    #[test]
    fn test_json_helpers() {
        let backend = MemoryBackend::new();
        save_json(&backend, "numbers.json", &vec![1, 2, 3]).unwrap();

        let text = String::from_utf8(backend.read("numbers.json").unwrap()).unwrap();
        assert!(text.contains('\n'), "expected pretty-printed JSON");

        let back: Vec<i32> = load_json(&backend, "numbers.json").unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_load_json_undecodable() {
        let backend = MemoryBackend::new().with_file("entries.json", "not json");
        let result: Result<Vec<i32>> = load_json(&backend, "entries.json");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}

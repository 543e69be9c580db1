//! Synchronous key-value byte stores.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::ProfilerError;

/// Minimal byte store. One key holds one opaque value.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProfilerError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProfilerError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), ProfilerError>;
}

/// One file per key: `<dir>/<key>.json`.
///
/// Writes go to a temp file in the same directory and are renamed over the
/// target, so a reader never sees a half-written value.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProfilerError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProfilerError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProfilerError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ProfilerError::Storage(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| ProfilerError::Storage(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(value)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ProfilerError::Storage(format!("Failed to write temp file: {}", e)))?;
        tmp.persist(&path).map_err(|e| {
            ProfilerError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProfilerError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProfilerError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// In-process store, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProfilerError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProfilerError> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProfilerError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("data"));

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", b"[1]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"[1]"[..]));
        assert!(dir.path().join("data").join("k.json").exists());

        store.set("k", b"[2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"[2]"[..]));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryKeyValueStore::new();
        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}

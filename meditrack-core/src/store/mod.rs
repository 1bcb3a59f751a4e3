//! Local fallback store.
//!
//! A string-keyed, string-valued store scoped to the device. Each entity kind
//! keeps its whole collection as one JSON array under its own key, and every
//! mutation rewrites that value wholesale.

mod collections;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StoreError;

pub use collections::{Loaded, LocalCollections};

/// Device-local key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` if the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Stores each key as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(path, e)),
        }
    }

    /// Writes through a temp file and a rename so a crash never leaves half
    /// a collection behind.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::Io(self.data_dir.clone(), e))?;

        let path = self.path(key);
        let tmp = self.data_dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp, value).map_err(|e| StoreError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Io(path, e))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(path, e)),
        }
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written value.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("data"));
        (store, temp_dir)
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (store, _temp) = test_store();
        assert!(store.get("meditrack-patients").unwrap().is_none());
    }

    #[test]
    fn test_set_creates_directory() {
        let (store, _temp) = test_store();
        store.set("meditrack-doctors", "[]").unwrap();

        assert!(store.data_dir().exists());
        assert!(store.path("meditrack-doctors").ends_with("meditrack-doctors.json"));
        assert_eq!(store.get("meditrack-doctors").unwrap().unwrap(), "[]");
    }

    #[test]
    fn test_set_overwrites_and_leaves_no_temp_file() {
        let (store, _temp) = test_store();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();

        assert_eq!(store.get("k").unwrap().unwrap(), "2");
        let entries: Vec<_> = fs::read_dir(store.data_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _temp) = test_store();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}

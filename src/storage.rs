//! String key-value storage for per-series UI state.
//!
//! Mirrors the browser local-storage model: synchronous string keys and
//! JSON-encoded string values. [`FileStore`] keeps everything in a single
//! JSON object on disk; [`MemoryStore`] keeps it in a map.

use crate::error::{AppError, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A synchronous string key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Missing keys are not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// Read a key, logging and swallowing store failures.
pub fn read_best_effort(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{}' from store: {}", key, e);
            None
        }
    }
}

/// Write a key, logging and swallowing store failures.
///
/// Returns whether the write went through.
pub fn write_best_effort(store: &mut dyn KeyValueStore, key: &str, value: &str) -> bool {
    match store.set_item(key, value) {
        Ok(()) => {
            debug!("Stored '{}' ({} bytes)", key, value.len());
            true
        }
        Err(e) => {
            warn!("Failed to write '{}' to store: {}", key, e);
            false
        }
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// A store persisted as one JSON object file.
///
/// The whole file is rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStore {
    /// Get the default path of the store file.
    ///
    /// Returns ~/.local/share/episode-browser/storage.json on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn default_path() -> std::result::Result<PathBuf, io::Error> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not find data directory"))?
            .join("episode-browser");

        Ok(data_dir.join("storage.json"))
    }

    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store. A file that is not a JSON
    /// object of strings is treated as empty and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Ok(Self {
                path,
                items: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let items = match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    "Ignoring malformed store file {}: {}",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Ok(Self { path, items })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, content)
            .map_err(|e| AppError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store whose every call fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(AppError::Storage("unavailable".to_string()))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::Storage("unavailable".to_string()))
        }

        fn remove_item(&mut self, _key: &str) -> Result<()> {
            Err(AppError::Storage("unavailable".to_string()))
        }
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));

        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove_item("a").unwrap();
        assert!(store.get_item("a").unwrap().is_none());
        store.remove_item("a").unwrap();
    }

    #[test]
    fn test_best_effort_swallows_failures() {
        let mut store = BrokenStore;
        assert!(read_best_effort(&store, "k").is_none());
        assert!(!write_best_effort(&mut store, "k", "v"));
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set_item("layout-preference-1", "grid").unwrap();
        assert!(path.exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_item("layout-preference-1").unwrap().as_deref(),
            Some("grid")
        );
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();
        store.remove_item("a").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get_item("a").unwrap().is_none());
        assert_eq!(reopened.get_item("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.get_item("anything").unwrap().is_none());

        store.set_item("k", "v").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("k").unwrap().as_deref(), Some("v"));
    }
}

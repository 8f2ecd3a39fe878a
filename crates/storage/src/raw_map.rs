//! The `RawMap` façade: a string-keyed byte blob store (spec §4.1).
//!
//! `RawMap` is the only storage primitive TStore's engine depends on
//! directly. Two implementations are provided: [`InMemoryRawMap`] for
//! tests and ephemeral databases, and [`FileRawMap`] for a
//! filesystem-backed tree where the key is the relative path.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tstore_core::{Result, TStoreError};

/// A string-keyed byte blob store with no batching and no transactions.
/// Failures are surfaced verbatim to the caller.
pub trait RawMap: Send + Sync {
    /// Read the bytes stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Write `data` under `key`, overwriting any previous value.
    fn set(&self, key: &str, data: Vec<u8>) -> Result<()>;
    /// Whether `key` is present.
    fn contain(&self, key: &str) -> Result<bool>;
    /// Remove `key`, if present. A no-op if absent.
    fn delete(&self, key: &str) -> Result<()>;
}

/// An in-memory `RawMap` backed by a single `RwLock<HashMap<..>>`. The
/// simplest conforming implementation for a shared resource (spec §5): a
/// single lock serializes every `get`/`set`/`contain`/`delete`.
#[derive(Debug, Default)]
pub struct InMemoryRawMap {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryRawMap {
    /// Build an empty in-memory map.
    pub fn new() -> Self {
        InMemoryRawMap::default()
    }
}

impl RawMap for InMemoryRawMap {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.data.write().insert(key.to_string(), data);
        Ok(())
    }

    fn contain(&self, key: &str) -> Result<bool> {
        Ok(self.data.read().contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}

/// A filesystem-backed `RawMap`: the key is a relative path under
/// `root_dir`, with parent directories auto-created on `set`.
#[derive(Debug)]
pub struct FileRawMap {
    root_dir: PathBuf,
}

impl FileRawMap {
    /// Root all keys under `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        FileRawMap {
            root_dir: root_dir.into(),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }
}

impl RawMap for FileRawMap {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TStoreError::Io(e)),
        }
    }

    fn set(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        Ok(())
    }

    fn contain(&self, key: &str) -> Result<bool> {
        Ok(self.resolve(key).exists())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TStoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trips() {
        let map = InMemoryRawMap::new();
        assert_eq!(map.get("a").unwrap(), None);
        map.set("a", b"hello".to_vec()).unwrap();
        assert_eq!(map.get("a").unwrap(), Some(b"hello".to_vec()));
        assert!(map.contain("a").unwrap());
        map.delete("a").unwrap();
        assert!(!map.contain("a").unwrap());
    }

    #[test]
    fn file_map_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let map = FileRawMap::new(dir.path());
        map.set("nested/deep/key", b"v".to_vec()).unwrap();
        assert_eq!(map.get("nested/deep/key").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn file_map_missing_key_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let map = FileRawMap::new(dir.path());
        assert_eq!(map.get("missing").unwrap(), None);
    }

    #[test]
    fn file_map_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let map = FileRawMap::new(dir.path());
        map.delete("never-existed").unwrap();
    }
}

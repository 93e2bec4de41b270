//! Key-value storage backends for jotter.
//!
//! The record store only needs a place to keep one value under one key.
//! [`KeyValueStore`] is that seam: [`SqliteStore`] persists to disk and
//! [`MemoryStore`] keeps everything in process.

pub mod schema;
mod sqlite;

use std::collections::HashMap;

use crate::error::Result;

pub use sqlite::{SqliteStore, StorageStats};

/// A string-keyed store of opaque byte values.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// In-process storage with no durability.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_missing() {
        let store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_set_and_get() {
        let mut store = MemoryStore::new();
        store.set("key", b"value").unwrap();
        assert_eq!(store.get("key").unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_overwrite() {
        let mut store = MemoryStore::new();
        store.set("key", b"first").unwrap();
        store.set("key", b"second").unwrap();
        assert_eq!(store.get("key").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.len(), 1);
    }

    fn write_through<S: KeyValueStore>(mut backend: S) {
        backend.set("key", b"through ref").unwrap();
        assert!(backend.get("key").unwrap().is_some());
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut store = MemoryStore::new();
        write_through(&mut store);
        assert_eq!(store.get("key").unwrap(), Some(b"through ref".to_vec()));
    }
}

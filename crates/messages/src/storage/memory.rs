//! In-memory key-value substrate
//!
//! Used for tests and for sessions that should not leave anything behind.

use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::KeyValueStore;

/// In-memory implementation of KeyValueStore
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    /// When set, every write fails (simulates a full or unavailable store)
    reject_writes: AtomicBool,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Create a store pre-populated with the given entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.entries.write().unwrap();
            for (k, v) in entries {
                map.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            bail!("quota exceeded writing {}", key);
        }
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.read("nope").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_read_remove() {
        let store = InMemoryKeyValueStore::new();
        store.write("k", "v1").unwrap();
        store.write("k", "v2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn test_rejected_write_keeps_old_value() {
        let store = InMemoryKeyValueStore::with_entries([("k", "old")]);
        store.set_reject_writes(true);
        assert!(store.write("k", "new").is_err());
        assert_eq!(store.read("k").unwrap().as_deref(), Some("old"));

        store.set_reject_writes(false);
        store.write("k", "new").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("new"));
    }
}

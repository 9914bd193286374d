//! In-memory [`KeyValueStore`].

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{CacheError, KeyValueStore};

/// A [`KeyValueStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Poisoned`] if the lock was poisoned.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, CacheError> {
        Ok(self.entries.lock().map_err(|_| CacheError::Poisoned)?.clone())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

//! Schema-versioned cache entry with a time-to-live.
//!
//! An entry is two store keys: the JSON payload and the millisecond epoch
//! timestamp of the write. Both keys embed the schema version, so bumping
//! the version makes every older entry invisible without deleting it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CacheError, Clock, KeyValueStore};

/// Store keys belonging to one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    /// Key of the serialized payload.
    pub payload: String,
    /// Key of the write timestamp.
    pub timestamp: String,
    /// Other keys owned by the entry. Only touched by [`VersionedCache::clear`].
    pub extra: Vec<String>,
}

impl CacheKeys {
    /// Builds keys of the form `{prefix}_processed_data_{year}_v{schema_version}`
    /// and `{prefix}_data_timestamp_v{schema_version}`.
    #[must_use]
    pub fn new(prefix: &str, year: u16, schema_version: u32) -> Self {
        Self {
            payload: format!("{prefix}_processed_data_{year}_v{schema_version}"),
            timestamp: format!("{prefix}_data_timestamp_v{schema_version}"),
            extra: Vec::new(),
        }
    }

    /// Adds keys that [`VersionedCache::clear`] should also delete.
    #[must_use]
    pub fn with_extra(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.extra.extend(keys);
        self
    }

    /// Iterates over every key owned by the entry.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        [self.payload.as_str(), self.timestamp.as_str()]
            .into_iter()
            .chain(self.extra.iter().map(String::as_str))
    }
}

/// A TTL-bounded cache entry over a [`KeyValueStore`].
pub struct VersionedCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    keys: CacheKeys,
    ttl: Duration,
}

impl VersionedCache {
    /// Creates a cache entry handle.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        keys: CacheKeys,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            keys,
            ttl,
        }
    }

    /// Returns the keys of this entry.
    #[must_use]
    pub const fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    /// Returns the time-to-live of this entry.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored write timestamp, if present and parseable.
    #[must_use]
    pub fn written_at(&self) -> Option<i64> {
        match self.store.get(&self.keys.timestamp) {
            Ok(Some(raw)) => raw.trim().parse().ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read cache timestamp {}: {e}", self.keys.timestamp);
                None
            }
        }
    }

    /// Returns `true` if the stored timestamp is younger than the TTL.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        let Some(written_at) = self.written_at() else {
            return false;
        };

        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let age = self.clock.now_millis().saturating_sub(written_at);
        age < ttl_ms
    }

    /// Reads and decodes the payload if the entry is fresh.
    ///
    /// A stale entry, a missing payload, a store read error, and an
    /// undecodable payload all read as `None`.
    #[must_use]
    pub fn read<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.is_fresh() {
            return None;
        }

        let raw = match self.store.get(&self.keys.payload) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read cache payload {}: {e}", self.keys.payload);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring corrupt cache payload {}: {e}", self.keys.payload);
                None
            }
        }
    }

    /// Serializes `value` and stores it with the current timestamp.
    ///
    /// The payload is written before the timestamp, so a failed write
    /// never makes an old payload look freshly written.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialization or either store write fails.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        self.store.set(&self.keys.payload, &payload)?;
        self.store
            .set(&self.keys.timestamp, &self.clock.now_millis().to_string())?;
        Ok(())
    }

    /// Deletes every key owned by the entry.
    ///
    /// Keeps going after a failed delete so one bad key doesn't leave the
    /// others behind.
    ///
    /// # Errors
    ///
    /// Returns the first [`CacheError`] encountered.
    pub fn clear(&self) -> Result<(), CacheError> {
        let mut first_error = None;

        for key in self.keys.all() {
            if let Err(e) = self.store.remove(key) {
                log::warn!("Failed to remove cache key {key}: {e}");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for VersionedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedCache")
            .field("keys", &self.keys)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedClock, MemoryStore};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn cache(
        store: &Arc<MemoryStore>,
        clock: &Arc<FixedClock>,
        schema_version: u32,
    ) -> VersionedCache {
        VersionedCache::new(
            store.clone(),
            clock.clone(),
            CacheKeys::new("eurostat", 2023, schema_version),
            DAY,
        )
    }

    #[test]
    fn builds_versioned_keys() {
        let keys = CacheKeys::new("eurostat", 2023, 4);
        assert_eq!(keys.payload, "eurostat_processed_data_2023_v4");
        assert_eq!(keys.timestamp, "eurostat_data_timestamp_v4");
    }

    #[test]
    fn reads_back_fresh_entry() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(1_000_000));
        let cache = cache(&store, &clock, 4);

        cache.write(&vec![1, 2, 3]).unwrap();
        clock.advance(DAY - Duration::from_millis(1));

        assert_eq!(cache.read::<Vec<i32>>(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn expires_after_ttl() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(1_000_000));
        let cache = cache(&store, &clock, 4);

        cache.write(&vec![1]).unwrap();
        clock.advance(DAY);

        assert!(!cache.is_fresh());
        assert_eq!(cache.read::<Vec<i32>>(), None);
    }

    #[test]
    fn missing_or_garbage_timestamp_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(1_000_000));
        let cache = cache(&store, &clock, 4);

        store
            .set("eurostat_processed_data_2023_v4", "[1]")
            .unwrap();
        assert_eq!(cache.read::<Vec<i32>>(), None);

        store.set("eurostat_data_timestamp_v4", "yesterday").unwrap();
        assert_eq!(cache.read::<Vec<i32>>(), None);
    }

    #[test]
    fn corrupt_payload_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(1_000_000));
        let cache = cache(&store, &clock, 4);

        cache.write(&vec![1]).unwrap();
        store
            .set("eurostat_processed_data_2023_v4", "[1, 2")
            .unwrap();

        assert!(cache.is_fresh());
        assert_eq!(cache.read::<Vec<i32>>(), None);
    }

    #[test]
    fn older_schema_version_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(1_000_000));

        cache(&store, &clock, 3).write(&vec![7]).unwrap();

        let current = cache(&store, &clock, 4);
        assert!(!current.is_fresh());
        assert_eq!(current.read::<Vec<i32>>(), None);
    }

    #[test]
    fn clear_removes_all_owned_keys() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(1_000_000));
        let cache = VersionedCache::new(
            store.clone(),
            clock,
            CacheKeys::new("eurostat", 2023, 4).with_extra(["raw".to_string()]),
            DAY,
        );

        store.set("raw", "{}").unwrap();
        store.set("unrelated", "x").unwrap();
        cache.write(&vec![1]).unwrap();

        cache.clear().unwrap();
        cache.clear().unwrap();

        let remaining = store.snapshot().unwrap();
        assert_eq!(remaining.keys().collect::<Vec<_>>(), vec!["unrelated"]);
    }
}

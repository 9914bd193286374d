#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Key-value cache stores and a versioned TTL cache.
//!
//! The metrics service persists its processed result through the
//! [`KeyValueStore`] trait so that production code can use the
//! file-backed [`FileStore`] while tests use [`MemoryStore`].
//! [`VersionedCache`] layers schema-versioned keys and a time-to-live on
//! top of any store.

pub mod clock;
pub mod file_store;
pub mod memory;
pub mod paths;
pub mod versioned;

pub use clock::{Clock, FixedClock, SystemClock};
pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use versioned::{CacheKeys, VersionedCache};

/// Errors that can occur during cache store operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The key cannot be used by this store.
    #[error("Invalid cache key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("Cache store lock poisoned")]
    Poisoned,
}

/// String-keyed, string-valued persistent storage.
///
/// Implementations must be safe to share across tasks. Removing a key
/// that does not exist is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Deletes `key` if present.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage cannot be modified.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

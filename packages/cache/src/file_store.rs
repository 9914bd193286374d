//! File-backed [`KeyValueStore`].
//!
//! Each key is stored as its own file under a cache directory. Writes go
//! to a temporary sibling file first and are renamed into place, so a
//! reader never observes a half-written value.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{CacheError, KeyValueStore, paths};

/// Per-process counter that gives every write its own temporary file.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A [`KeyValueStore`] that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store under `<data_dir>/cache`.
    #[must_use]
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(paths::cache_dir(data_dir))
    }

    /// Returns the directory holding the cache files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if !valid {
            return Err(CacheError::InvalidKey {
                key: key.to_string(),
            });
        }

        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        paths::ensure_dir(&self.dir)?;

        let tmp = self.dir.join(format!(
            ".{key}.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let written = std::fs::write(&tmp, value).and_then(|()| std::fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        log::debug!("Wrote cache key {key} to {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

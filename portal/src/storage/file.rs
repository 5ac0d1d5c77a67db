//! Directory-backed key-value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling
//! and are renamed into place, so a failed write never truncates the value
//! that was there before.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{DEFAULT_QUOTA_BYTES, KeyValueStore, StorageError};

const EXTENSION: &str = "json";

/// A [`KeyValueStore`] that keeps one file per key in a directory.
pub struct FileStore {
    dir: PathBuf,
    quota: usize,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir` with the default
    /// quota.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::with_quota(dir, DEFAULT_QUOTA_BYTES)
    }

    /// Opens a store with a custom quota in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn with_quota(dir: impl Into<PathBuf>, quota: usize) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), quota, "file store opened");
        Ok(Self {
            dir,
            quota,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    /// Bytes used by every key except `skip`.
    fn used_bytes_excluding(&self, skip: &str) -> Result<usize, StorageError> {
        let mut total = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem == skip {
                continue;
            }
            let len = usize::try_from(entry.metadata()?.len()).unwrap_or(usize::MAX);
            total = total.saturating_add(stem.len()).saturating_add(len);
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock();

        let needed = self
            .used_bytes_excluding(key)?
            .saturating_add(key.len())
            .saturating_add(value.len());
        if needed > self.quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }

        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Io(e));
        }
        Ok(())
    }
}

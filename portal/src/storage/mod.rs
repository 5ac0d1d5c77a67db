//! Durable key-value storage for portal collections.
//!
//! Defines the [`KeyValueStore`] trait (string keys, string values) and the
//! storage codec on top of it: [`load`] and [`save`] turn whole collections
//! into JSON documents and back.
//!
//! Neither function ever returns an error. A missing or corrupt document
//! loads as the caller's fallback; a failed write is logged and dropped,
//! leaving the previously persisted document in place. The in-memory stores
//! stay authoritative for the running session.

pub mod debounce;
pub mod file;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use portal_proto::codec;

pub use debounce::Debouncer;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage key for the task list.
pub const TASKS_KEY: &str = "tasks";

/// Storage key for the message thread.
pub const MESSAGES_KEY: &str = "messages";

/// Default storage quota in bytes (matches typical browser local storage).
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Errors a [`KeyValueStore`] can report.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Writing the value would exceed the store's capacity.
    #[error("quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured capacity.
        quota: usize,
    },

    /// The key cannot be used as a storage name.
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    /// The underlying medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A string key-value store.
///
/// Implementations include:
/// - [`FileStore`]: one JSON document per key in a directory
/// - [`MemoryStore`]: in-memory map for tests and ephemeral sessions
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// On error the previous value must be left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] if the store is full, or
    /// another [`StorageError`] if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Loads the collection stored under `key`, or `fallback`.
///
/// The fallback is returned when the key is absent, the store cannot be
/// read, or the stored text does not decode as `T`.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, fallback: T) -> T {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return fallback,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed, using fallback");
            return fallback;
        }
    };

    match codec::decode(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value is corrupt, using fallback");
            fallback
        }
    }
}

/// Serializes `value` and writes it under `key`.
///
/// Failures are logged and otherwise ignored. Returns whether the write
/// reached the store.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let text = match codec::encode(value) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not encode value, write dropped");
            return false;
        }
    };

    match store.set(key, &text) {
        Ok(()) => {
            tracing::debug!(key, bytes = text.len(), "saved");
            true
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "storage write failed, previous value kept");
            false
        }
    }
}

/// Opens the store a session persists to.
///
/// `None` gives an ephemeral [`MemoryStore`]. If the directory cannot be
/// opened the session falls back to memory as well, so the portal stays
/// usable without persistence.
pub fn open_store(data_dir: Option<&Path>, quota: usize) -> Arc<dyn KeyValueStore> {
    let Some(dir) = data_dir else {
        tracing::info!("using ephemeral in-memory storage");
        return Arc::new(MemoryStore::with_quota(quota));
    };

    match FileStore::with_quota(dir, quota) {
        Ok(store) => {
            tracing::info!(dir = %dir.display(), "using file storage");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "cannot open data directory, changes will not persist"
            );
            Arc::new(MemoryStore::with_quota(quota))
        }
    }
}

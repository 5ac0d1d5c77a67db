//! In-memory key-value store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{DEFAULT_QUOTA_BYTES, KeyValueStore, StorageError};

/// A [`KeyValueStore`] held entirely in memory.
///
/// Used by tests and `--ephemeral` sessions. Capacity is accounted as the
/// sum of key and value lengths, and a write that would push the total over
/// the quota fails with [`StorageError::QuotaExceeded`].
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store with the default quota.
    #[must_use]
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Creates an empty store with a custom quota in bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota,
        }
    }

    /// Total bytes currently held (keys plus values).
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    /// Removes every entry, as if storage were cleared externally.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = others + key.len() + value.len();
        if needed > self.quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }
        entries.insert(key.to_string(), value.to_string());
        drop(entries);
        Ok(())
    }
}

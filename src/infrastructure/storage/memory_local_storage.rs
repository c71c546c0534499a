//! In-process local storage with a browser-style byte quota.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::repositories::{LocalStorage, StorageError};

/// Typical per-origin browser local-storage budget.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Local storage held in a process-local map.
///
/// The quota counts key and value bytes of every entry, the way browsers
/// account for `localStorage`. A write that would exceed it fails and leaves
/// the previous value in place.
pub struct MemoryLocalStorage {
    entries: RwLock<HashMap<String, String>>,
    quota: usize,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota,
        }
    }

    /// Bytes currently used by all entries.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }
}

impl Default for MemoryLocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;

        let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
        let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
        let size = key.len() + value.len();

        if used - replaced + size > self.quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size,
                limit: self.quota,
            });
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }
}

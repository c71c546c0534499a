//! Port for client-local persistent key/value storage.

use thiserror::Error;

/// Errors raised by a local storage write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage quota exceeded writing '{key}' ({size} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },
    /// Storage is disabled or unusable, e.g. in a private browsing mode.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to serialize value: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Synchronous string key/value storage with browser local-storage semantics.
///
/// Writes complete before returning and carry no durability guarantee beyond
/// the backing medium. Values persist until overwritten.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::CookieLocalStorage`] - entries carried as browser cookies
/// - [`crate::infrastructure::storage::MemoryLocalStorage`] - in-process map with a byte quota
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
pub trait LocalStorage: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] if the entry does not fit and
    /// [`StorageError::Unavailable`] if storage cannot be used at all.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Reads the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;
}

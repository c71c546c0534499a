//! Repository trait for the remote `users` profile collection.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{NewProfile, ProfileRecord, UserId};

/// Errors raised by the remote document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("document store error: {0}")]
    Internal(String),
}

/// Repository interface for user profile documents.
///
/// Documents are keyed by [`UserId`] and always written whole: there is no
/// field-level merge and no history.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgProfileRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryProfileRepository`] - process-local map
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_profile.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Creates or fully replaces the document for `uid`.
    ///
    /// The store assigns `login_at` from its own clock.
    ///
    /// # Returns
    ///
    /// The record as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the write is not acknowledged.
    async fn overwrite(
        &self,
        uid: &UserId,
        profile: &NewProfile,
    ) -> Result<ProfileRecord, RepositoryError>;

    /// Finds the document for `uid`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on store errors.
    async fn find(&self, uid: &UserId) -> Result<Option<ProfileRecord>, RepositoryError>;

    /// Lists the most recently logged-in profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on store errors.
    async fn list_recent(&self, limit: i64) -> Result<Vec<ProfileRecord>, RepositoryError>;

    /// Deletes the document for `uid`.
    ///
    /// # Returns
    ///
    /// `true` if a document existed.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on store errors.
    async fn delete(&self, uid: &UserId) -> Result<bool, RepositoryError>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}

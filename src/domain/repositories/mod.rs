//! Port trait definitions for the domain layer.
//!
//! This module defines the interfaces (traits) through which the login flow
//! reaches every external collaborator. Concrete adapters live in the
//! infrastructure layer, so the flow never touches a process-wide handle.
//!
//! # Architecture
//!
//! - Traits define the contract for each external collaborator
//! - Implementations live in `crate::infrastructure`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Ports
//!
//! - [`IdentityProvider`] - Popup sign-in and bearer token issuance
//! - [`LocalStorage`] - Client-local key/value storage
//! - [`ProfileRepository`] - Remote `users` profile documents
//! - [`Navigator`] - Client application navigation

pub mod identity_provider;
pub mod local_storage;
pub mod navigator;
pub mod profile_repository;

pub use identity_provider::{IdentityProvider, ProviderError};
pub use local_storage::{LocalStorage, StorageError};
pub use navigator::Navigator;
pub use profile_repository::{ProfileRepository, RepositoryError};

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
#[cfg(test)]
pub use local_storage::MockLocalStorage;
#[cfg(test)]
pub use navigator::MockNavigator;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;

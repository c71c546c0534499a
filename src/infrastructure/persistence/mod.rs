//! Profile repository implementations.
//!
//! # Repositories
//!
//! - [`PgProfileRepository`] - PostgreSQL-backed `users` collection
//! - [`InMemoryProfileRepository`] - Process-local fallback when no database is configured

pub mod memory_profile_repository;
pub mod pg_profile_repository;

pub use memory_profile_repository::InMemoryProfileRepository;
pub use pg_profile_repository::PgProfileRepository;

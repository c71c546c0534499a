//! Domain layer containing login entities and port definitions.
//!
//! This module holds the data model of a sign-in and the traits through which
//! the login flow reaches its external collaborators. It has no dependencies
//! on infrastructure or presentation layers.
//!
//! # Architecture
//!
//! - [`entities`] - Identity, session marker, profile record, routes
//! - [`repositories`] - Port traits implemented by the infrastructure layer
//!
//! # Login Data Flow
//!
//! 1. The identity provider yields an [`entities::Identity`] and a [`entities::BearerToken`]
//! 2. Both are cached client-side as an [`entities::LocalSessionMarker`]
//! 3. A [`entities::ProfileRecord`] is written remotely, keyed by user id
//! 4. The client navigates to [`entities::Route::root`]

pub mod entities;
pub mod repositories;

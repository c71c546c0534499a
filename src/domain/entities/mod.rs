//! Core domain entities representing the login data model.
//!
//! Entities are plain data structures with constructor-level validation
//! and no I/O.
//!
//! # Entity Types
//!
//! - [`Identity`] - The authenticated user as reported by the identity provider
//! - [`BearerToken`] - Opaque provider token, redacted in `Debug` output
//! - [`LocalSessionMarker`] - Identity + token cached in client-local storage
//! - [`ProfileRecord`] - Remote document summarizing the latest login
//! - [`Route`] - Navigation target after a successful login

pub mod identity;
pub mod profile;
pub mod route;
pub mod session_marker;

pub use identity::{BearerToken, Identity, IdentityError, UserId};
pub use profile::{NewProfile, ProfileRecord};
pub use route::Route;
pub use session_marker::{LocalSessionMarker, TOKEN_KEY, USER_KEY};

//! Browser-facing layer.
//!
//! Serves the login page, the identity provider popup endpoints and the home
//! view. Uses Askama templates for server-side rendering.
//!
//! # Modules
//!
//! - [`handlers`] - Template rendering and popup callback handlers
//! - [`middleware`] - Session marker check for pages behind login
//! - [`routes`] - Route configuration
//!
//! Client-local storage is carried in cookies, see
//! [`crate::infrastructure::storage::CookieLocalStorage`].

pub mod handlers;
pub mod middleware;
pub mod routes;

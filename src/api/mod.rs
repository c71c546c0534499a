//! JSON API layer.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Rate limiting and request tracing middleware

pub mod dto;
pub mod handlers;
pub mod middleware;

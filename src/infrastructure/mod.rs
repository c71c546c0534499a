//! Infrastructure layer for external integrations.
//!
//! This layer implements the ports defined by the domain layer.
//!
//! # Modules
//!
//! - [`identity`] - Popup sign-in brokered over HTTP callbacks
//! - [`navigation`] - Navigation recorded for HTTP redirects
//! - [`persistence`] - Profile repositories (PostgreSQL and in-memory)
//! - [`storage`] - Client-local storage (cookies and in-memory)

pub mod identity;
pub mod navigation;
pub mod persistence;
pub mod storage;

//! Web-specific middleware.

pub mod session_marker;

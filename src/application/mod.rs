//! Application layer services implementing the login use-case.
//!
//! This layer orchestrates domain ports: it owns the order of the steps,
//! the failure containment and the state transitions, while every external
//! effect goes through a trait from [`crate::domain::repositories`].
//!
//! # Available Services
//!
//! - [`services::login_service::LoginService`] - Popup sign-in, session marker, profile record, navigation

pub mod services;

//! Data Transfer Objects for the JSON API.

pub mod health;

//! Client-local storage implementations.
//!
//! - [`CookieLocalStorage`] - Browser storage carried through request/response cookies
//! - [`MemoryLocalStorage`] - Process-local map with a browser-style quota

mod cookie_local_storage;
mod memory_local_storage;

pub use cookie_local_storage::{CookieLocalStorage, CookieSettings, MAX_COOKIE_BYTES};
pub use memory_local_storage::{DEFAULT_QUOTA_BYTES, MemoryLocalStorage};

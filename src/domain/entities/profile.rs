//! Profile record stored in the remote `users` collection.

use chrono::{DateTime, Utc};

use super::identity::{Identity, UserId};

/// Server-side summary of a user's latest login.
///
/// One record per [`UserId`]. Each login replaces every field; no login
/// history is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub uid: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Assigned by the store at write time, never by the caller.
    pub login_at: DateTime<Utc>,
}

/// Fields written by a login, before the store assigns `login_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&Identity> for NewProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.display_name().map(str::to_string),
            email: identity.email().map(str::to_string),
        }
    }
}

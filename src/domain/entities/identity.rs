//! Identity entity returned by the identity provider after a popup sign-in.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when provider data cannot form a valid [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("bearer token must not be empty")]
    EmptyToken,
}

/// Provider-assigned unique user identifier.
///
/// ## Invariants
/// - trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Builds a user id from raw provider input.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptyUserId`] if the value is blank.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptyUserId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Authenticated user as reported by the identity provider.
///
/// The application holds a read-only snapshot; a later login supersedes it
/// with a new value instead of mutating this one. Serialized as
/// `{"id": ..., "name": ..., "email": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "id")]
    uid: UserId,
    #[serde(rename = "name")]
    display_name: Option<String>,
    email: Option<String>,
}

impl Identity {
    /// Creates a new identity snapshot.
    pub fn new(uid: UserId, display_name: Option<String>, email: Option<String>) -> Self {
        Self {
            uid,
            display_name,
            email,
        }
    }

    pub fn uid(&self) -> &UserId {
        &self.uid
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Opaque bearer token issued by the identity provider.
///
/// The token is never inspected or validated here. `Debug` output is
/// redacted so tokens do not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw provider token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptyToken`] if the value is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(IdentityError::EmptyToken);
        }
        Ok(Self(raw))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

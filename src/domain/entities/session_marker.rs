//! Client-local session marker written after a successful sign-in.

use super::identity::{BearerToken, Identity};

/// Local-storage key holding the JSON-serialized [`Identity`].
pub const USER_KEY: &str = "user";

/// Local-storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Cached copy of the signed-in identity plus its bearer token.
///
/// The presence of the [`USER_KEY`] entry is what the web layer treats as
/// "logged in". Every successful login overwrites both entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSessionMarker {
    identity: Identity,
    token: BearerToken,
}

impl LocalSessionMarker {
    pub fn new(identity: Identity, token: BearerToken) -> Self {
        Self { identity, token }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Returns the storage entries in write order: user first, then token.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity cannot be serialized to JSON.
    pub fn entries(&self) -> Result<[(&'static str, String); 2], serde_json::Error> {
        let user = serde_json::to_string(&self.identity)?;
        Ok([
            (USER_KEY, user),
            (TOKEN_KEY, self.token.expose().to_string()),
        ])
    }

    /// Reads the identity back from a stored [`USER_KEY`] value.
    ///
    /// Returns `None` if the value is not a valid serialized identity.
    pub fn parse_user(raw: &str) -> Option<Identity> {
        serde_json::from_str(raw).ok()
    }
}

//! Client application route.

use std::fmt;

/// A path inside the client application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(String);

impl Route {
    /// The home view, `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// The login screen, `/login`.
    pub fn login() -> Self {
        Self("/login".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

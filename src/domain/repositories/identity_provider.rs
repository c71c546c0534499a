//! Port for the external identity provider's popup sign-in.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{BearerToken, Identity};

/// Provider-defined sign-in failure.
///
/// `Display` yields the provider error code, e.g. `popup-closed-by-user`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The user closed the popup before finishing.
    #[error("popup-closed-by-user")]
    PopupClosedByUser,
    /// The browser refused to open the popup.
    #[error("popup-blocked")]
    PopupBlocked,
    #[error("network-request-failed: {0}")]
    Network(String),
    /// The popup is unknown or was discarded before anyone waited on it.
    #[error("popup-expired")]
    PopupExpired,
    #[error("token-unavailable")]
    TokenUnavailable,
    /// Any other provider error code, passed through verbatim.
    #[error("{code}")]
    Rejected { code: String },
}

impl ProviderError {
    /// Maps a provider error code to a typed error.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "popup-closed-by-user" | "auth/popup-closed-by-user" => Self::PopupClosedByUser,
            "popup-blocked" | "auth/popup-blocked" => Self::PopupBlocked,
            "network-request-failed" | "auth/network-request-failed" => {
                Self::Network("network request failed".to_string())
            }
            other => Self::Rejected {
                code: other.to_string(),
            },
        }
    }

    /// Short machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            Self::PopupClosedByUser => "popup-closed-by-user",
            Self::PopupBlocked => "popup-blocked",
            Self::Network(_) => "network-request-failed",
            Self::PopupExpired => "popup-expired",
            Self::TokenUnavailable => "token-unavailable",
            Self::Rejected { code } => code,
        }
    }
}

/// External identity provider offering an interactive popup sign-in.
///
/// # Implementations
///
/// - [`crate::infrastructure::identity::PopupIdentityProvider`] - popup brokered over HTTP callbacks
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Runs the popup sign-in and suspends until it resolves or rejects.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on cancellation, a blocked popup, network
    /// failure or any provider-side rejection.
    async fn sign_in_with_popup(&self) -> Result<Identity, ProviderError>;

    /// Requests a fresh bearer token for a signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if no token can be obtained.
    async fn fresh_token(&self, identity: &Identity) -> Result<BearerToken, ProviderError>;
}

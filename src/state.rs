//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::FailurePolicy;
use crate::config::Config;
use crate::domain::repositories::ProfileRepository;
use crate::infrastructure::identity::PopupBroker;
use crate::infrastructure::storage::CookieSettings;

/// Per-deployment settings used to build a login flow for each request.
#[derive(Debug, Clone)]
pub struct LoginSettings {
    pub failure_policy: FailurePolicy,
    /// Provider page the popup window is sent to.
    pub idp_popup_url: String,
    /// Where the provider returns the popup.
    pub callback_url: String,
    pub cookies: CookieSettings,
}

impl LoginSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            failure_policy: config.failure_policy,
            idp_popup_url: config.idp_popup_url.clone(),
            callback_url: config.popup_callback_url(),
            cookies: CookieSettings {
                secure: config.cookie_secure,
                ..CookieSettings::default()
            },
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileRepository>,
    pub popups: Arc<PopupBroker>,
    pub login: Arc<LoginSettings>,
}

impl AppState {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        popup_ttl: Duration,
        login: LoginSettings,
    ) -> Self {
        Self {
            profiles,
            popups: Arc::new(PopupBroker::new(popup_ttl)),
            login: Arc::new(login),
        }
    }
}

//! Handlers for the identity provider's popup window.
//!
//! The popup is sent to the provider, the provider sends it back to
//! [`popup_callback_handler`], and the result is handed to the login flow
//! waiting on the same [`PopupId`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;
use url::Url;
use validator::Validate;

use crate::domain::entities::{BearerToken, Identity, UserId};
use crate::domain::repositories::ProviderError;
use crate::error::AppError;
use crate::infrastructure::identity::{PopupId, PopupResult};
use crate::state::AppState;

/// Error code used when the provider's callback cannot be understood.
const INVALID_CALLBACK: &str = "invalid-callback";

/// Self-closing page shown in the popup window once it has reported back.
#[derive(Template, WebTemplate)]
#[template(path = "popup_done.html")]
struct PopupDoneTemplate {
    signed_in: bool,
}

/// Query parameters the provider appends when returning the popup.
///
/// Either `error` is set, or `uid` and `id_token` describe the signed-in user.
#[derive(Debug, Deserialize, Validate)]
pub struct PopupCallback {
    pub state: String,
    pub error: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub uid: Option<String>,
    #[validate(length(max = 256))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub id_token: Option<String>,
}

impl PopupCallback {
    fn into_result(self) -> Result<PopupResult, AppError> {
        self.validate().map_err(|e| {
            AppError::bad_request("Invalid provider callback", json!(e.field_errors()))
        })?;

        let uid = UserId::new(self.uid.unwrap_or_default())
            .map_err(|e| AppError::bad_request(e.to_string(), json!({ "field": "uid" })))?;
        let token = BearerToken::new(self.id_token.unwrap_or_default())
            .map_err(|e| AppError::bad_request(e.to_string(), json!({ "field": "id_token" })))?;

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Ok(PopupResult {
            identity: Identity::new(uid, non_empty(self.name), non_empty(self.email)),
            token,
        })
    }
}

fn parse_popup(raw: &str) -> Result<PopupId, AppError> {
    PopupId::parse(raw)
        .ok_or_else(|| AppError::not_found("Unknown popup", json!({ "popup": raw })))
}

fn unknown_popup(popup: &PopupId) -> AppError {
    AppError::not_found("Unknown popup", json!({ "popup": popup.as_str() }))
}

/// Sends the popup window to the identity provider.
///
/// # Endpoint
///
/// `GET /auth/popup/{id}`
///
/// Redirects to `IDP_POPUP_URL` with `state` set to the popup id and
/// `redirect_uri` set to the callback endpoint.
pub async fn popup_start_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let popup = parse_popup(&id)?;

    let mut target = Url::parse(&state.login.idp_popup_url).map_err(|e| {
        tracing::error!("Invalid identity provider URL: {}", e);
        AppError::internal("Identity provider misconfigured", json!({}))
    })?;
    target
        .query_pairs_mut()
        .append_pair("state", popup.as_str())
        .append_pair("redirect_uri", &state.login.callback_url);

    Ok(Redirect::to(target.as_str()))
}

/// Receives the provider's sign-in result.
///
/// # Endpoint
///
/// `GET /auth/popup/callback?state=...`
///
/// # Responses
///
/// - **200 OK**: self-closing page; the waiting login flow is resumed
/// - **400 Bad Request**: the payload is invalid; the popup is rejected
/// - **404 Not Found**: the popup is unknown or already completed
///
/// # Trust
///
/// `uid`, `name`, `email` and `id_token` are taken as reported; the token is
/// not verified with the provider. Any client that can reach this endpoint
/// can complete its own popup as any `uid` and overwrite that user's profile
/// record. Only expose it where the provider is the sole caller.
pub async fn popup_callback_handler(
    State(state): State<AppState>,
    Query(callback): Query<PopupCallback>,
) -> Result<impl IntoResponse, AppError> {
    let popup = parse_popup(&callback.state)?;

    if let Some(code) = callback.error.as_deref() {
        if !state.popups.reject(&popup, ProviderError::from_code(code)) {
            return Err(unknown_popup(&popup));
        }
        return Ok(PopupDoneTemplate { signed_in: false });
    }

    match callback.into_result() {
        Ok(result) => {
            if !state.popups.resolve(&popup, result) {
                return Err(unknown_popup(&popup));
            }
            Ok(PopupDoneTemplate { signed_in: true })
        }
        Err(err) => {
            let rejected = ProviderError::Rejected {
                code: INVALID_CALLBACK.to_string(),
            };
            if !state.popups.reject(&popup, rejected) {
                return Err(unknown_popup(&popup));
            }
            Err(err)
        }
    }
}

/// Records that the user closed the popup window.
///
/// # Endpoint
///
/// `POST /auth/popup/{id}/closed`
///
/// # Responses
///
/// - **204 No Content**: the popup is rejected with `popup-closed-by-user`
/// - **404 Not Found**: the popup is unknown or already completed
pub async fn popup_closed_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let popup = parse_popup(&id)?;

    if state.popups.reject(&popup, ProviderError::PopupClosedByUser) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(unknown_popup(&popup))
    }
}

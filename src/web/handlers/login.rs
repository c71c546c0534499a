//! Login page and login submission handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::application::services::LoginService;
use crate::domain::entities::Route;
use crate::error::AppError;
use crate::infrastructure::identity::{PopupId, PopupIdentityProvider};
use crate::infrastructure::navigation::ResponseNavigator;
use crate::infrastructure::storage::CookieLocalStorage;
use crate::state::AppState;

/// Template for the login page.
///
/// Renders `templates/login.html` with:
/// - The "Sign in" button bound to a freshly opened popup
/// - Failure feedback, when the deployment surfaces it
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginTemplate {
    popup_id: String,
    error: Option<&'static str>,
}

impl LoginTemplate {
    fn new(state: &AppState, error: Option<&'static str>) -> Self {
        Self {
            popup_id: state.popups.open().to_string(),
            error,
        }
    }
}

/// Login form submitted once the popup window has finished.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub popup: String,
}

/// Renders the login page.
///
/// # Endpoint
///
/// `GET /login`
///
/// Each render opens a new popup; the page's script sends the popup window
/// to `/auth/popup/{id}` and submits the form when it closes.
pub async fn login_page_handler(State(state): State<AppState>) -> impl IntoResponse {
    LoginTemplate::new(&state, None)
}

/// Runs the login flow for a completed (or abandoned) popup.
///
/// # Endpoint
///
/// `POST /login` with form field `popup`
///
/// # Responses
///
/// - **303 See Other** to `/` on success, with `Set-Cookie` for `user` and `token`
/// - **200 OK** with the login page on failure; any entry stored before the
///   failure is still sent as `Set-Cookie`
/// - **400 Bad Request** if `popup` is not a popup id
pub async fn login_submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let popup = PopupId::parse(&form.popup).ok_or_else(|| {
        AppError::bad_request("Invalid popup id", json!({ "popup": form.popup }))
    })?;

    let settings = &state.login;
    let storage = Arc::new(CookieLocalStorage::from_headers(
        settings.cookies.clone(),
        &headers,
    ));
    let navigator = Arc::new(ResponseNavigator::new());
    let provider = Arc::new(PopupIdentityProvider::new(state.popups.clone(), popup));

    let flow = LoginService::new(
        provider,
        storage.clone(),
        state.profiles.clone(),
        navigator.clone(),
    )
    .with_failure_policy(settings.failure_policy);

    let mut response = match flow.initiate().await {
        Ok(_) => {
            let destination = navigator.destination().unwrap_or_else(Route::root);
            Redirect::to(destination.as_str()).into_response()
        }
        Err(err) => {
            LoginTemplate::new(&state, flow.failure_policy().feedback(&err)).into_response()
        }
    };

    for cookie in storage.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping unrepresentable cookie: {}", e),
        }
    }

    Ok(response)
}

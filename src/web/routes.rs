//! Browser-facing route configuration.

use crate::state::AppState;
use crate::web::handlers::{
    home_handler, login_page_handler, login_submit_handler, popup_callback_handler,
    popup_closed_handler, popup_start_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Routes requiring a session marker.
///
/// Protected via [`crate::web::middleware::session_marker`].
///
/// # Endpoints
///
/// - `GET /` - Home view
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/", get(home_handler))
}

/// Public routes without a session marker.
///
/// # Endpoints
///
/// - `GET /login` - Login page
/// - `GET /auth/popup/{id}` - Sends the popup window to the provider
/// - `GET /auth/popup/callback` - Provider return
/// - `POST /auth/popup/{id}/closed` - Popup window closed by the user
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page_handler))
        .route("/auth/popup/callback", get(popup_callback_handler))
        .route("/auth/popup/{id}", get(popup_start_handler))
        .route("/auth/popup/{id}/closed", post(popup_closed_handler))
}

/// Login submission, kept separate so it can be rate limited more strictly.
///
/// # Endpoints
///
/// - `POST /login` - Runs the login flow
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login_submit_handler))
}

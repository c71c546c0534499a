//! Home view shown after a successful login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Extension, response::IntoResponse};

use crate::domain::entities::Identity;

/// Template for the home page.
///
/// Renders `templates/home.html` with the signed-in user's name and email.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
struct HomeTemplate {
    name: String,
    email: Option<String>,
}

/// Renders the home page.
///
/// # Endpoint
///
/// `GET /`
///
/// The identity comes from the `user` entry checked by
/// [`crate::web::middleware::session_marker`].
pub async fn home_handler(Extension(identity): Extension<Identity>) -> impl IntoResponse {
    HomeTemplate {
        name: identity
            .display_name()
            .unwrap_or(identity.uid().as_str())
            .to_string(),
        email: identity.email().map(str::to_string),
    }
}

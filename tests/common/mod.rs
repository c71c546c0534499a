#![allow(dead_code)]

use async_trait::async_trait;
use axum::routing::get;
use axum::{Router, middleware};
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use urban_fix_login::api::handlers::health_handler;
use urban_fix_login::application::services::FailurePolicy;
use urban_fix_login::domain::entities::{NewProfile, ProfileRecord, UserId};
use urban_fix_login::domain::repositories::{ProfileRepository, RepositoryError};
use urban_fix_login::infrastructure::persistence::InMemoryProfileRepository;
use urban_fix_login::infrastructure::storage::CookieSettings;
use urban_fix_login::state::{AppState, LoginSettings};
use urban_fix_login::web;
use urban_fix_login::web::middleware::session_marker;

pub const IDP_POPUP_URL: &str = "https://idp.example.com/popup";
pub const CALLBACK_URL: &str = "http://localhost:3000/auth/popup/callback";

/// Profile store that is always unreachable.
pub struct UnavailableProfileRepository;

#[async_trait]
impl ProfileRepository for UnavailableProfileRepository {
    async fn overwrite(
        &self,
        _uid: &UserId,
        _profile: &NewProfile,
    ) -> Result<ProfileRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn find(&self, _uid: &UserId) -> Result<Option<ProfileRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<ProfileRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _uid: &UserId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

pub fn create_test_state(failure_policy: FailurePolicy) -> AppState {
    create_test_state_with(Arc::new(InMemoryProfileRepository::new()), failure_policy)
}

pub fn create_test_state_with(
    profiles: Arc<dyn ProfileRepository>,
    failure_policy: FailurePolicy,
) -> AppState {
    AppState::new(
        profiles,
        Duration::from_secs(600),
        LoginSettings {
            failure_policy,
            idp_popup_url: IDP_POPUP_URL.to_string(),
            callback_url: CALLBACK_URL.to_string(),
            cookies: CookieSettings::default(),
        },
    )
}

/// Same routes as the production router, without per-IP rate limiting
/// (the test transport has no peer address).
pub fn test_router(state: AppState) -> Router {
    let protected = web::routes::protected_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), session_marker::layer),
    );

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .merge(web::routes::public_routes())
        .merge(web::routes::login_routes())
        .with_state(state)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_router(state)).unwrap()
}

/// Extracts the popup id embedded in a rendered login page.
pub fn popup_id_from(html: &str) -> String {
    let marker = r#"name="popup" value=""#;
    let start = html.find(marker).expect("login page carries a popup id") + marker.len();
    html[start..start + 32].to_string()
}

/// Opens a popup by rendering the login page.
pub async fn open_popup(server: &TestServer) -> String {
    let page = server.get("/login").await;
    page.assert_status_ok();
    popup_id_from(&page.text())
}

/// Completes a popup the way the provider would.
pub async fn complete_popup(server: &TestServer, popup: &str, uid: &str, name: &str) {
    server
        .get("/auth/popup/callback")
        .add_query_param("state", popup)
        .add_query_param("uid", uid)
        .add_query_param("name", name)
        .add_query_param("email", "ada@x.com")
        .add_query_param("id_token", "tok123")
        .await
        .assert_status_ok();
}

/// Returns the `name=value` pairs of every `Set-Cookie` header.
pub fn set_cookie_pairs(response: &axum_test::TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .collect()
}

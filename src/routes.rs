//! Top-level router configuration combining API and web routes.
//!
//! # Route Structure
//!
//! - `GET  /`                        - Home view (session marker required)
//! - `GET  /login`                   - Login page (public)
//! - `POST /login`                   - Login submission (public, strict rate limit)
//! - `GET  /auth/popup/*`            - Identity provider popup endpoints (public)
//! - `GET  /health`                  - Health check: profile store, popups (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket
//! - **Session marker** - `user` cookie check on the home view
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use crate::web;
use crate::web::middleware::session_marker;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting keys on the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let web_protected = web::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_marker::layer,
        ))
        .layer(rate_limit::layer());

    let web_public = web::routes::public_routes().layer(rate_limit::layer());

    let login_submit = web::routes::login_routes().layer(rate_limit::secure_layer());

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(web_protected)
        .merge(web_public)
        .merge(login_submit)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The profile store is unreachable
///
/// # Components Checked
///
/// 1. **Profile store**: Round trip to the configured repository
/// 2. **Popups**: Number of popups awaiting completion (informational)
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "profile_store": { "status": "ok", "message": "Reachable" },
///     "popups": { "status": "ok", "message": "Pending: 0" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = if state.profiles.health_check().await {
        CheckStatus::ok("Reachable")
    } else {
        CheckStatus::error("Profile store unreachable")
    };

    let popups_check = CheckStatus::ok(format!("Pending: {}", state.popups.pending_count()));

    let all_healthy = store_check.is_ok() && popups_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            profile_store: store_check,
            popups: popups_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

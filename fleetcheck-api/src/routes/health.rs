/// Health check endpoint
///
/// `GET /health` reports liveness plus a database ping. Unauthenticated and
/// outside the rate-limited API prefix so load balancers can poll it freely.

use crate::app::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_shared::db::pool;
use serde_json::json;

/// `GET /health`
///
/// Returns 200 with `{"status": "ok"}` when the database responds, 503 with
/// `{"status": "degraded"}` otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match pool::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
        }
    }
}

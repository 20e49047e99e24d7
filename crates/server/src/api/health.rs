use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use super::AppState;

/// `GET /health` -- liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /metrics` -- point-in-time archive job counters.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.runner.metrics().snapshot())
}

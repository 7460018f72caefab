// ============================================================================
// Health & Metrics Endpoints
// ============================================================================

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::error::AppResult;
use crate::metrics;

/// Liveness probe. Checks nothing downstream: a healthy service with a dead
/// collaborator must still report alive.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Prometheus metrics in text exposition format.
pub async fn metrics_handler() -> AppResult<String> {
    Ok(metrics::gather_metrics()?)
}

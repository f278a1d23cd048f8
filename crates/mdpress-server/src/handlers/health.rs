//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// Response for GET /api/health.
#[derive(Serialize)]
struct HealthResponse {
    /// Fixed liveness marker.
    status: &'static str,
}

/// Handle GET /api/health.
pub(crate) async fn health() -> Json<impl Serialize> {
    Json(HealthResponse { status: "ok" })
}

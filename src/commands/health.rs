//! Liveness probe.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`: always healthy, touches nothing.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

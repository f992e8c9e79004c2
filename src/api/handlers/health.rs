use crate::types::HealthResponse;
use axum::Json;

/// Liveness probe. Does not touch any collaborator.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

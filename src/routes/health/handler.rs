use axum::{Json, extract::State};
use chrono::Utc;

use super::model::{HealthResponse, ReadyResponse};
use crate::AppState;

/// Liveness: always healthy while the process serves requests.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: state.version.to_string(),
    })
}

/// Readiness: static, dependencies are not probed.
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready".to_string(),
        timestamp: Utc::now(),
    })
}

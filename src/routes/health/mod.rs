mod handler;
mod model;

pub use handler::{health, ready};
pub use model::{HealthResponse, ReadyResponse};

use axum::{Router, routing::get};

use crate::AppState;

/// Monitoring routes under `/health`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/", get(health))
        .route("/health/ready", get(ready))
}

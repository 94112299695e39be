use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

use crate::config::ServerConfig;
use crate::error::AppError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    pub timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TimeoutConfig {
    /// Uses the server read timeout, falling back to [`DEFAULT_TIMEOUT`].
    pub fn from_server(cfg: &ServerConfig) -> Self {
        let timeout = if cfg.read_timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            cfg.read_timeout
        };
        Self { timeout }
    }
}

/// Absolute deadline of the current request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(pub Instant);

/// Bounds downstream work; the handler future is dropped on expiry.
///
/// A timeout too large to express as an [`Instant`] leaves the request
/// without a [`Deadline`].
pub async fn timeout(
    State(config): State<TimeoutConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(deadline) = Instant::now().checked_add(config.timeout) {
        req.extensions_mut().insert(Deadline(deadline));
    }

    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(config.timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, %path, timeout = ?config.timeout, "Request timed out");
            AppError::RequestTimeout.into_response()
        }
    }
}

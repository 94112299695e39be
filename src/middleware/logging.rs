use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use super::context::RequestContext;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Exact paths that are never logged (probe endpoints).
    pub skip_paths: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            skip_paths: ["/health", "/health/", "/health/ready", "/ready"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl LoggingConfig {
    pub fn should_log(&self, path: &str) -> bool {
        !self.skip_paths.iter().any(|skip| skip == path)
    }
}

pub async fn logging(
    State(config): State<Arc<LoggingConfig>>,
    req: Request,
    next: Next,
) -> Response {
    if !config.should_log(req.uri().path()) {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_owned());
    let request_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency = ?start.elapsed(),
        %remote_addr,
        %request_id,
        "request"
    );

    response
}

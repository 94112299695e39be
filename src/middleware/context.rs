use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::time::Instant;

use crate::error::AppError;

/// Per-request metadata attached by the middleware chain.
///
/// Handlers take it as an extractor:
///
/// ```ignore
/// async fn handler(ctx: RequestContext) -> String {
///     ctx.request_id
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    /// Set when the request runs under the timeout middleware.
    pub deadline: Option<Instant>,
}

impl RequestContext {
    /// Time left before the timeout middleware cancels the request.
    pub fn remaining(&self) -> Option<std::time::Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(AppError::InternalServerError)
    }
}

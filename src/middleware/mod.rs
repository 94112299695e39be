// Middleware chain, applied outermost first:
// recovery -> timeout -> request id -> logging -> cors

use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state};
use tower::ServiceBuilder;

use crate::config::Config;

mod context;
mod cors;
mod logging;
mod recovery;
mod request_id;
mod timeout;

pub use context::RequestContext;
pub use cors::{CorsConfig, cors};
pub use logging::{LoggingConfig, logging};
pub use recovery::{PanicResponder, RecoveryConfig};
pub use request_id::{REQUEST_ID_HEADER, RequestIdConfig, request_id};
pub use timeout::{DEFAULT_TIMEOUT, Deadline, TimeoutConfig, timeout};

#[derive(Debug, Clone, Default)]
pub struct MiddlewareConfig {
    pub recovery: RecoveryConfig,
    pub timeout: TimeoutConfig,
    pub request_id: RequestIdConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

impl MiddlewareConfig {
    /// Defaults, with the timeout taken from the server read timeout.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            timeout: TimeoutConfig::from_server(&cfg.server),
            ..Self::default()
        }
    }

    /// Wraps every route of `router` in the full chain.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(
            ServiceBuilder::new()
                .layer(recovery::layer(self.recovery))
                .layer(from_fn_with_state(self.timeout, timeout))
                .layer(from_fn_with_state(self.request_id, request_id))
                .layer(from_fn_with_state(Arc::new(self.logging), logging))
                .layer(from_fn_with_state(Arc::new(self.cors), cors)),
        )
    }
}

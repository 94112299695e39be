use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::AppState;
use crate::middleware::MiddlewareConfig;
use crate::routes;

/// Time in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listen address {0:?}")]
    InvalidAddress(String),
    #[error("in-flight requests did not finish within {0:?}")]
    ShutdownTimedOut(Duration),
}

/// Routes plus the middleware chain.
pub fn build_app(state: AppState, middleware: MiddlewareConfig) -> Router {
    middleware.apply(routes::create_router(state))
}

/// Resolves `address` (hostnames included) and binds the first address that
/// accepts.
pub async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(address)
        .await
        .map_err(|_| ServerError::InvalidAddress(address.to_owned()))?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) => last_err = Some(e),
        }
    }

    match last_err {
        Some(e) => Err(ServerError::Io(e)),
        None => Err(ServerError::InvalidAddress(address.to_owned())),
    }
}

/// Serves `app` until `shutdown` resolves, then stops accepting and drains
/// in-flight requests for at most `grace`.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    let (started_tx, mut started_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        tracing::info!("Shutting down server...");
        let _ = started_tx.send(true);
    })
    .into_future();

    let drain_deadline = async move {
        if started_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server exited gracefully");
            Ok(())
        }
        _ = drain_deadline => {
            tracing::error!(grace = ?grace, "Server forced to shutdown");
            Err(ServerError::ShutdownTimedOut(grace))
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

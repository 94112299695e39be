use std::sync::Arc;

use anyhow::Context;
use deployease::{
    AppState,
    cache::CacheStore,
    config::Config,
    database::{DatabaseManager, RedisManager},
    middleware::MiddlewareConfig,
    server::{self, SHUTDOWN_GRACE_PERIOD},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("Warning: .env file not found or could not be loaded: {e}");
    }

    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config);

    tracing::info!(
        environment = %config.environment,
        address = %config.server.address(),
        "Starting DeployEase server"
    );

    for key in config.server.unenforced_timeouts() {
        tracing::warn!(key, "Timeout is configured but not enforced by the HTTP server");
    }

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;
    let redis = RedisManager::connect(&config.redis)
        .await
        .context("failed to connect to Redis")?;

    let cache = CacheStore::new(Arc::new(redis.backend()));
    let middleware = MiddlewareConfig::from_config(&config);
    let listener = server::bind(&config.server.address()).await?;
    let state = AppState::new(config, db.clone(), cache);

    let app = server::build_app(state, middleware);
    let result = server::serve(
        listener,
        app,
        server::shutdown_signal(),
        SHUTDOWN_GRACE_PERIOD,
    )
    .await;

    db.close().await;
    redis.close();
    result?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

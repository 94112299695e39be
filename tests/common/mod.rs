//! Shared helpers for integration tests.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::Response;
use deployease::{
    AppState,
    cache::{CacheStore, MemoryBackend},
    config::Config,
    database::DatabaseManager,
};

/// Config with only the mandatory secret supplied.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config::load_with(
        |name| (name == "DEPLOYEASE_JWT_SECRET").then(|| "integration-secret".to_string()),
        &[],
    )
    .expect("test config should load")
}

/// State backed by an in-memory store and a lazy (never connected) pool.
#[allow(dead_code)]
pub fn test_state() -> (AppState, Arc<MemoryBackend>) {
    let config = test_config();
    let backend = Arc::new(MemoryBackend::new());
    let db = DatabaseManager::connect_lazy(&config.database).expect("lazy pool");
    let cache = CacheStore::new(backend.clone());
    (AppState::new(config, db, cache), backend)
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

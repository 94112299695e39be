use std::sync::Arc;

use crate::cache::{CacheStore, SessionStore};
use crate::config::Config;
use crate::database::DatabaseManager;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod utils;

/// Version reported by the health endpoint.
pub const API_VERSION: &str = "1.0.0";

/// Handles shared by every request. All fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseManager,
    pub cache: CacheStore,
    pub sessions: SessionStore,
    pub version: &'static str,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseManager, cache: CacheStore) -> Self {
        Self {
            config: Arc::new(config),
            db,
            sessions: SessionStore::new(cache.clone()),
            cache,
            version: API_VERSION,
        }
    }
}

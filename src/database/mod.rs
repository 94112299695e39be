// Connection managers for Postgres and the Redis-compatible cache.

pub mod postgres;
pub mod redis_manager;

pub use postgres::DatabaseManager;
pub use redis_manager::RedisManager;

use thiserror::Error;

/// Budget for the startup and health-check pings.
pub const PING_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("invalid database configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("failed to connect to Redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("{0} did not answer within the ping timeout")]
    PingTimeout(&'static str),
}

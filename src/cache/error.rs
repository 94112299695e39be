use chrono::{DateTime, Utc};
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Key absent, or already reclaimed by the backing store.
    #[error("key not found")]
    NotFound,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("backing store error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("session expiry must be in the future (got {expires_at})")]
    InvalidExpiry { expires_at: DateTime<Utc> },
}

impl CacheError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }
}

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::error::CacheResult;

mod memory_backend;
mod redis_backend;

pub use memory_backend::MemoryBackend;
pub use redis_backend::RedisBackend;

/// Byte-level key-value store with per-key expiry.
///
/// The typed stores only ever talk to this trait, so the same code runs
/// against Redis (or Dragonfly) in production and [`MemoryBackend`] in tests.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// `None` when the key is absent or has expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Writes `value`. A zero `ttl` stores the key without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`; succeeds whether or not it existed.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Lightweight liveness probe.
    async fn ping(&self) -> CacheResult<()>;
}

/// TTL in whole milliseconds, never rounded down to zero.
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_millis().min(u128::from(u64::MAX)) as u64;
    millis.max(1)
}

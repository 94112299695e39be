// Cache module
// Key-value backends plus the typed cache and session stores built on them.

pub mod backend;
pub mod error;
pub mod keys;
pub mod models;
pub mod operations;

pub use backend::{KeyValueBackend, MemoryBackend, RedisBackend};
pub use error::{CacheError, CacheResult};
pub use models::Session;
pub use operations::{CacheStore, SessionStore};

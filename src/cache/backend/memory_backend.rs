use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{KeyValueBackend, ttl_millis};
use crate::cache::error::CacheResult;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process backend for tests and local development.
///
/// Expired keys are reclaimed on access, mirroring what Redis exposes to
/// clients.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + Duration::from_millis(ttl_millis(ttl)))
        };
        self.entries
            .lock()
            .await
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_keys_read_as_absent() {
        let backend = MemoryBackend::new();
        backend
            .set("short", b"v".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();
        backend
            .set("forever", b"v".to_vec(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(backend.get("short").await.unwrap(), Some(b"v".to_vec()));
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(backend.get("short").await.unwrap(), None);
        assert_eq!(backend.get("forever").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.delete("missing").await.unwrap();
        backend.set("k", b"v".to_vec(), Duration::ZERO).await.unwrap();
        backend.delete("k").await.unwrap();
        backend.delete("k").await.unwrap();
        assert!(backend.is_empty().await);
    }
}

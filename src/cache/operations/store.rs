use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::backend::KeyValueBackend;
use crate::cache::error::{CacheError, CacheResult};

/// Probe budget for [`CacheStore::health_check`].
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// JSON-encoded values over a shared key-value backend.
///
/// No retries are attempted; callers own their retry policy.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn KeyValueBackend>,
    probe_timeout: Duration,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Reads and decodes `key`, or [`CacheError::NotFound`].
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let bytes = self.backend.get(key).await?.ok_or(CacheError::NotFound)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Encodes `value` and writes it with `ttl` (zero means no expiry).
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, bytes, ttl).await
    }

    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        self.backend.delete(key).await
    }

    /// Pings the backend within the probe timeout.
    pub async fn health_check(&self) -> CacheResult<()> {
        let probe = self.backend.ping();
        let result = match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Unavailable(format!(
                "health probe timed out after {:?}",
                self.probe_timeout
            ))),
        };

        if let Err(ref e) = result {
            tracing::warn!(error = %e, "Cache health check failed");
        }
        result
    }
}

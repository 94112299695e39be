use std::time::Duration;

use chrono::Utc;

use crate::cache::error::{CacheError, CacheResult};
use crate::cache::keys::session_key;
use crate::cache::models::Session;
use crate::cache::operations::store::CacheStore;

/// Session persistence with lazy expiry reconciliation.
#[derive(Clone)]
pub struct SessionStore {
    store: CacheStore,
}

impl SessionStore {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Fetches a live session.
    ///
    /// A session whose `expires_at` has passed is treated as absent even if
    /// the backing store still holds it; the stale key is deleted on a
    /// best-effort basis.
    pub async fn get(&self, session_id: &str) -> CacheResult<Option<Session>> {
        let session: Session = match self.store.get(&session_key(session_id)).await {
            Ok(session) => session,
            Err(CacheError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        if session.is_expired_at(Utc::now()) {
            let _ = self.delete(session_id).await;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Writes `session` with a TTL of `expires_at - now`.
    pub async fn set(&self, session: &Session) -> CacheResult<()> {
        let ttl = session
            .remaining_at(Utc::now())
            .ok_or(CacheError::InvalidExpiry {
                expires_at: session.expires_at,
            })?;

        self.store.set(&session_key(&session.id), session, ttl).await
    }

    pub async fn delete(&self, session_id: &str) -> CacheResult<()> {
        self.store.delete(&session_key(session_id)).await
    }

    /// Pushes expiry to `now + ttl`. `None` if the session is gone.
    pub async fn refresh(
        &self,
        session_id: &str,
        ttl: Duration,
    ) -> CacheResult<Option<Session>> {
        let Some(mut session) = self.get(session_id).await? else {
            return Ok(None);
        };

        let extension = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        session.expires_at = Utc::now()
            .checked_add_signed(extension)
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        self.set(&session).await?;
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::{KeyValueBackend, MemoryBackend};
    use std::sync::Arc;

    fn stores() -> (Arc<MemoryBackend>, SessionStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::new(CacheStore::new(backend.clone()));
        (backend, store)
    }

    #[tokio::test]
    async fn stale_session_is_reconciled_on_read() {
        let (backend, store) = stores();
        let mut session = Session::new("user", Duration::from_secs(60));
        session.expires_at = Utc::now() - chrono::Duration::seconds(1);

        // Store TTL still far away; only the stamped expiry has passed.
        backend
            .set(
                &session_key(&session.id),
                serde_json::to_vec(&session).unwrap(),
                Duration::from_secs(3600),
            )
            .await
            .unwrap();

        assert_eq!(store.get(&session.id).await.unwrap(), None);
        assert_eq!(backend.get(&session_key(&session.id)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn zero_ttl_refresh_is_rejected() {
        let (_, store) = stores();
        let session = Session::new("user", Duration::from_secs(60));
        store.set(&session).await.unwrap();

        let err = store.refresh(&session.id, Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidExpiry { .. }));
    }

    #[tokio::test]
    async fn corrupt_session_surfaces_decode_error() {
        let (backend, store) = stores();
        backend
            .set("session:broken", b"{".to_vec(), Duration::ZERO)
            .await
            .unwrap();

        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }
}

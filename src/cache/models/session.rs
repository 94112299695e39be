use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::generate_id;

/// A user's authenticated interaction window.
///
/// `expires_at` is authoritative: the backing store TTL is derived from it on
/// write, and reads re-check it against the wall clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// New session with a generated id, expiring `ttl` from now.
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            id: generate_id(),
            user_id: user_id.into(),
            data: Map::new(),
            expires_at: Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Time left before expiry, `None` once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

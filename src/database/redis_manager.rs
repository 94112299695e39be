use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{AsyncConnectionConfig, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use super::{DatabaseError, PING_TIMEOUT};
use crate::cache::RedisBackend;
use crate::config::RedisConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Owns the client and the multiplexed connection shared by every store.
pub struct RedisManager {
    client: Client,
    conn: MultiplexedConnection,
}

impl RedisManager {
    pub async fn connect(cfg: &RedisConfig) -> Result<Self, DatabaseError> {
        let info = connection_info(cfg)?;
        tracing::info!(addr = %info.addr, db = cfg.db, "Connecting to Redis");

        let client = Client::open(info)?;
        let conn_config = AsyncConnectionConfig::new()
            .set_connection_timeout(CONNECT_TIMEOUT)
            .set_response_timeout(RESPONSE_TIMEOUT);
        let conn = client
            .get_multiplexed_async_connection_with_config(&conn_config)
            .await?;

        let manager = Self { client, conn };
        manager.ping().await?;
        tracing::info!("Connected to Redis");
        Ok(manager)
    }

    pub async fn ping(&self) -> Result<(), DatabaseError> {
        let mut conn = self.conn.clone();
        let probe = async move {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, redis::RedisError>(())
        };
        match tokio::time::timeout(PING_TIMEOUT, probe).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(DatabaseError::PingTimeout("Redis")),
        }
    }

    /// Store backend sharing this manager's connection.
    pub fn backend(&self) -> RedisBackend {
        RedisBackend::new(self.conn.clone())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Drops this handle; the connection closes once the last backend clone
    /// is gone.
    pub fn close(self) {
        tracing::info!("Redis manager closed");
    }
}

pub(crate) fn connection_info(cfg: &RedisConfig) -> Result<ConnectionInfo, DatabaseError> {
    let port: u16 = cfg
        .port
        .parse()
        .map_err(|_| DatabaseError::InvalidConfig(format!("invalid redis port {:?}", cfg.port)))?;

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(cfg.host.clone(), port),
        redis: RedisConnectionInfo {
            db: cfg.db,
            password: (!cfg.password.is_empty()).then(|| cfg.password.clone()),
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RedisConfig {
        RedisConfig {
            host: "cache.internal".into(),
            port: "6380".into(),
            password: String::new(),
            db: 1,
        }
    }

    #[test]
    fn connection_info_follows_config() {
        let info = connection_info(&config()).unwrap();
        assert_eq!(info.addr, ConnectionAddr::Tcp("cache.internal".into(), 6380));
        assert_eq!(info.redis.db, 1);
        assert_eq!(info.redis.password, None);

        let mut cfg = config();
        cfg.password = "hunter2".into();
        let info = connection_info(&cfg).unwrap();
        assert_eq!(info.redis.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut cfg = config();
        cfg.port = "sixty".into();
        assert!(matches!(
            connection_info(&cfg),
            Err(DatabaseError::InvalidConfig(_))
        ));
    }
}

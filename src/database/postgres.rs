use std::str::FromStr;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use super::{DatabaseError, PING_TIMEOUT};
use crate::config::DatabaseConfig;

const APPLICATION_NAME: &str = "deployease";

/// Owns the Postgres connection pool.
#[derive(Clone, Debug)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Builds the pool and verifies connectivity with a ping.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = pool_options(cfg).connect_with(connect_options(cfg)?).await?;
        let manager = Self { pool };

        if let Err(e) = manager.health_check().await {
            manager.close().await;
            return Err(e);
        }

        tracing::info!(host = %cfg.host, database = %cfg.dbname, "Connected to Postgres");
        Ok(manager)
    }

    /// Builds the pool without opening any connection.
    pub fn connect_lazy(cfg: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = pool_options(cfg).connect_lazy_with(connect_options(cfg)?);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `SELECT 1` within [`PING_TIMEOUT`].
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let probe = sqlx::query("SELECT 1").execute(&self.pool);
        match tokio::time::timeout(PING_TIMEOUT, probe).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(DatabaseError::PingTimeout("Postgres")),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

pub(crate) fn connect_options(
    cfg: &DatabaseConfig,
) -> Result<PgConnectOptions, DatabaseError> {
    let port: u16 = cfg
        .port
        .parse()
        .map_err(|_| DatabaseError::InvalidConfig(format!("invalid port {:?}", cfg.port)))?;
    let ssl_mode = PgSslMode::from_str(&cfg.sslmode)
        .map_err(|_| DatabaseError::InvalidConfig(format!("invalid sslmode {:?}", cfg.sslmode)))?;

    let mut options = PgConnectOptions::new()
        .host(&cfg.host)
        .port(port)
        .username(&cfg.user)
        .database(&cfg.dbname)
        .ssl_mode(ssl_mode)
        .application_name(APPLICATION_NAME);
    if !cfg.password.is_empty() {
        options = options.password(&cfg.password);
    }
    Ok(options)
}

fn pool_options(cfg: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.max_open_conns.max(1))
        .min_connections(cfg.max_idle_conns.min(cfg.max_open_conns))
        .max_lifetime(cfg.conn_max_lifetime)
        .idle_timeout(cfg.conn_max_idle_time)
        .acquire_timeout(PING_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".into(),
            port: "5432".into(),
            user: "testuser".into(),
            password: "testpass".into(),
            dbname: "testdb".into(),
            sslmode: "disable".into(),
            max_open_conns: 10,
            max_idle_conns: 2,
            conn_max_lifetime: Duration::from_secs(60),
            conn_max_idle_time: Duration::from_secs(30),
        }
    }

    #[test]
    fn options_follow_config() {
        let options = connect_options(&config()).unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "testuser");
        assert_eq!(options.get_database(), Some("testdb"));
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Disable));
    }

    #[test]
    fn bad_port_or_sslmode_is_rejected() {
        let mut cfg = config();
        cfg.port = "not-a-port".into();
        assert!(matches!(
            connect_options(&cfg),
            Err(DatabaseError::InvalidConfig(_))
        ));

        let mut cfg = config();
        cfg.sslmode = "sometimes".into();
        assert!(matches!(
            connect_options(&cfg),
            Err(DatabaseError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let manager = DatabaseManager::connect_lazy(&config()).unwrap();
        assert!(!manager.pool().is_closed());
        manager.close().await;
        assert!(manager.pool().is_closed());
    }
}

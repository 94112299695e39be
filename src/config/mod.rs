use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{File, FileFormat};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Environment variable prefix, e.g. `DEPLOYEASE_SERVER_PORT`.
pub const ENV_PREFIX: &str = "DEPLOYEASE";

/// Placeholder secret shipped as the default; refused by validation.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";

/// Defaults for timeouts the listener carries but cannot enforce.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Every recognised key, in dotted form.
const KEYS: &[&str] = &[
    "environment",
    "server.port",
    "server.host",
    "server.read_timeout",
    "server.write_timeout",
    "server.idle_timeout",
    "database.host",
    "database.port",
    "database.user",
    "database.password",
    "database.dbname",
    "database.sslmode",
    "database.max_open_conns",
    "database.max_idle_conns",
    "database.conn_max_lifetime",
    "database.conn_max_idle_time",
    "jwt.secret",
    "jwt.expiration",
    "redis.host",
    "redis.port",
    "redis.password",
    "redis.db",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("server port is required")]
    MissingServerPort,
    #[error("database host is required")]
    MissingDatabaseHost,
    #[error("JWT secret must be set and not use default value")]
    InsecureJwtSecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: String,
    pub host: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub idle_timeout: Duration,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub conn_max_lifetime: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub conn_max_idle_time: Duration,
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub expiration: Duration,
}

#[derive(Clone, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: String,
    pub password: String,
    pub db: i64,
}

impl Config {
    /// Loads configuration from the process environment and default search paths.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| env::var(name).ok(), &default_search_paths())
    }

    /// Merges defaults, the first `config.yaml` found in `search_paths`, and
    /// the variables returned by `lookup`, then validates the result.
    pub fn load_with<F>(lookup: F, search_paths: &[PathBuf]) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = set_defaults(::config::Config::builder())?;

        if let Some(file) = search_paths.iter().find_map(|dir| find_config_file(dir)) {
            tracing::debug!(path = %file.display(), "Using configuration file");
            builder = builder.add_source(File::from(file).format(FileFormat::Yaml));
        }

        for key in KEYS {
            builder = builder.set_override_option(*key, lookup(&env_var_name(key)))?;
        }

        let cfg: Config = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port.is_empty() {
            return Err(ConfigError::MissingServerPort);
        }

        if self.database.host.is_empty() {
            return Err(ConfigError::MissingDatabaseHost);
        }

        if self.jwt.secret.is_empty() || self.jwt.secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::InsecureJwtSecret);
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl ServerConfig {
    /// `host:port` as handed to the listener. IPv6 hosts are bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Keys set to a non-default value that `axum::serve` has no knob for.
    pub fn unenforced_timeouts(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.write_timeout != DEFAULT_WRITE_TIMEOUT {
            keys.push("server.write_timeout");
        }
        if self.idle_timeout != DEFAULT_IDLE_TIMEOUT {
            keys.push("server.idle_timeout");
        }
        keys
    }
}

impl DatabaseConfig {
    /// Connection URL equivalent to the options used by the pool manager.
    pub fn dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.dbname, self.sslmode
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("sslmode", &self.sslmode)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .field("conn_max_idle_time", &self.conn_max_idle_time)
            .finish()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("db", &self.db)
            .finish()
    }
}

type Builder = ::config::ConfigBuilder<::config::builder::DefaultState>;

fn set_defaults(builder: Builder) -> Result<Builder, ::config::ConfigError> {
    builder
        .set_default("environment", "development")?
        // server
        .set_default("server.port", "8080")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.read_timeout", "15s")?
        .set_default("server.write_timeout", "15s")?
        .set_default("server.idle_timeout", "60s")?
        // database
        .set_default("database.host", "localhost")?
        .set_default("database.port", "5432")?
        .set_default("database.user", "deployease")?
        .set_default("database.password", "")?
        .set_default("database.dbname", "deployease")?
        .set_default("database.sslmode", "disable")?
        .set_default("database.max_open_conns", 25_i64)?
        .set_default("database.max_idle_conns", 5_i64)?
        .set_default("database.conn_max_lifetime", "5m")?
        .set_default("database.conn_max_idle_time", "5m")?
        // jwt
        .set_default("jwt.secret", DEFAULT_JWT_SECRET)?
        .set_default("jwt.expiration", "24h")?
        // redis
        .set_default("redis.host", "localhost")?
        .set_default("redis.port", "6379")?
        .set_default("redis.password", "")?
        .set_default("redis.db", 0_i64)
}

/// `server.read_timeout` -> `DEPLOYEASE_SERVER_READ_TIMEOUT`
pub fn env_var_name(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.replace('.', "_").to_uppercase())
}

pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("."), PathBuf::from("./config")];
    if let Ok(home) = env::var("HOME") {
        paths.push(Path::new(&home).join(".deployease"));
    }
    paths.push(PathBuf::from("/etc/deployease"));
    paths
}

fn find_config_file(dir: &Path) -> Option<PathBuf> {
    ["config.yaml", "config.yml"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Accepts humantime strings (`15s`, `5m`, `24h`) or bare seconds.
fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw).map_err(|e| format!("invalid duration {raw:?}: {e}"))
}

//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Listing behaviour.
    #[serde(default)]
    pub moments: MomentsConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "moments_finder=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MomentsConfig {
    /// Page size used when a request does not give one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound on unpaginated listings. Unset means unbounded.
    #[serde(default)]
    pub list_all_limit: Option<u32>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8090
}

fn default_db_path() -> String {
    "moments.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    moments_db::DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    moments_db::DbRuntimeSettings::default().pool_max_size
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> u32 {
    moments_types::DEFAULT_PAGE_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for MomentsConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            list_all_limit: None,
        }
    }
}

impl DatabaseConfig {
    pub fn runtime_settings(&self) -> moments_db::DbRuntimeSettings {
        moments_db::DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `MOMENTS_HOST` overrides `server.host`
/// - `MOMENTS_PORT` overrides `server.port`
/// - `MOMENTS_DB_PATH` overrides `database.path`
/// - `MOMENTS_LOG_LEVEL` overrides `logging.level`
/// - `MOMENTS_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `MOMENTS_LIST_ALL_LIMIT` overrides `moments.list_all_limit`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("MOMENTS_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("MOMENTS_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("MOMENTS_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("MOMENTS_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("MOMENTS_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(limit) = var("MOMENTS_LIST_ALL_LIMIT") {
        match limit.trim() {
            "" => config.moments.list_all_limit = None,
            value => {
                if let Ok(parsed) = value.parse() {
                    config.moments.list_all_limit = Some(parsed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        let config = toml::from_str::<Config>("").expect("empty config parses");
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.moments.default_page_size, 10);
        assert!(config.moments.list_all_limit.is_none());

        // Loading tolerates a missing file.
        assert!(load_config(path.to_str()).is_ok());
    }

    #[test]
    fn file_sections_are_parsed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 9000

            [database]
            path = "/var/lib/moments.db"
            pool_max_size = 2

            [moments]
            list_all_limit = 500
            "#,
        )
        .expect("write config");

        let config = toml::from_str::<Config>(&std::fs::read_to_string(&path).expect("read"))
            .expect("valid config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, "/var/lib/moments.db");
        assert_eq!(config.database.runtime_settings().pool_max_size, 2);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.moments.list_all_limit, Some(500));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").expect("write config");
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("MOMENTS_PORT", "7000"),
            ("MOMENTS_HOST", "not-an-ip"),
            ("MOMENTS_LOG_JSON", "1"),
            ("MOMENTS_LIST_ALL_LIMIT", "25"),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, default_host(), "invalid host is ignored");
        assert!(config.logging.json);
        assert_eq!(config.moments.list_all_limit, Some(25));
    }
}

//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use domain::TransitionPolicy;
use thiserror::Error;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::Invalid {
                var: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `DATABASE_URL`: Postgres connection string; unset selects the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `DATABASE_LOCK_TIMEOUT_MS`: per-transaction lock wait limit (default: none)
/// - `ORDER_STATUS_POLICY`: `strict` or `override` (default: `strict`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_lock_timeout: Option<Duration>,
    pub status_policy: TransitionPolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", var("PORT"))?.unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: parse_var("LOG_FORMAT", var("LOG_FORMAT"))?
                .unwrap_or(defaults.log_format),
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS"),
            )?
            .unwrap_or(defaults.database_max_connections),
            database_lock_timeout: parse_var::<u64>(
                "DATABASE_LOCK_TIMEOUT_MS",
                var("DATABASE_LOCK_TIMEOUT_MS"),
            )?
            .map(Duration::from_millis),
            status_policy: parse_var("ORDER_STATUS_POLICY", var("ORDER_STATUS_POLICY"))?
                .unwrap_or(defaults.status_policy),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value })
        })
        .transpose()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            database_max_connections: 5,
            database_lock_timeout: None,
            status_policy: TransitionPolicy::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert!(config.database_lock_timeout.is_none());
        assert_eq!(config.status_policy, TransitionPolicy::Strict);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_reads_every_variable() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/inventory"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_LOCK_TIMEOUT_MS", "2500"),
            ("ORDER_STATUS_POLICY", "override"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/inventory")
        );
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(
            config.database_lock_timeout,
            Some(Duration::from_millis(2500))
        );
        assert_eq!(config.status_policy, TransitionPolicy::Override);
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = from_pairs(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert_eq!(
            from_pairs(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                var: "PORT",
                value: "eighty".to_string()
            }
        );
        assert!(from_pairs(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(from_pairs(&[("ORDER_STATUS_POLICY", "loose")]).is_err());
        assert!(from_pairs(&[("DATABASE_LOCK_TIMEOUT_MS", "-1")]).is_err());
    }
}

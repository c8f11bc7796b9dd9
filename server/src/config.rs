//! Configuration management for the todo server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! `main` loads an optional `.env` file first, so the same variables can live
//! there during development.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Which [`KeyValueStore`](todo_core::KeyValueStore) backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    /// Process-local store; data is gone on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownStore(s.to_string())),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Redis => f.write_str("redis"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown TODO_STORE `{0}` (expected `redis` or `memory`)")]
    UnknownStore(String),

    #[error("invalid PORT `{0}`")]
    InvalidPort(String),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Redis endpoint, `REDIS_URL`.
    pub redis_url: String,
    /// Backend selection, `TODO_STORE`.
    pub store: StoreBackend,
    /// Bind host, `HOST`.
    pub host: String,
    /// Bind port, `PORT`.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("TODO_STORE") {
            Some(value) => value.parse()?,
            None => StoreBackend::Redis,
        };
        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            store,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            store: StoreBackend::Redis,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_point_at_local_redis() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn overrides_are_applied() {
        let config = from_vars(&[
            ("REDIS_URL", "redis://cache:6380"),
            ("TODO_STORE", "Memory"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(config.redis_url, "redis://cache:6380");
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn unknown_store_is_rejected() {
        let err = from_vars(&[("TODO_STORE", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStore(ref s) if s == "postgres"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = from_vars(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }
}

//! Configuration management for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Environment variable name
        name: &'static str,
        /// Raw value found
        value: String,
    },

    /// Host and port do not form a socket address
    #[error("Invalid bind address {0}")]
    InvalidBindAddress(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Database configuration; `None` runs the server on the in-memory store
    pub database: Option<DatabaseConfig>,
    /// API client configuration (used by `todo-demo`)
    pub client: ClientConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

/// Todo API client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `http://localhost:3000/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric variable is set
    /// but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric variable is set
    /// but unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout: parse_or(&lookup, "DATABASE_CONNECT_TIMEOUT", 30)?,
            }),
            None => None,
        };

        Ok(Self {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "SERVER_PORT", 3000)?,
                shutdown_timeout: parse_or(&lookup, "SHUTDOWN_TIMEOUT", 30)?,
            },
            database,
            client: ClientConfig {
                base_url: lookup("TODO_API_URL")
                    .unwrap_or_else(|| "http://localhost:3000/api".to_string()),
                timeout: parse_or(&lookup, "TODO_API_TIMEOUT_SECS", 10)?,
            },
        })
    }
}

impl ServerConfig {
    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] if `host` is not an IP address.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(address))
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl DatabaseConfig {
    /// Pool connect timeout
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl ClientConfig {
    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.database, None);
        assert_eq!(config.client.base_url, "http://localhost:3000/api");
        assert_eq!(config.client.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.server.bind_address().unwrap(),
            "0.0.0.0:3000".parse().unwrap()
        );
    }

    #[test]
    fn database_section_follows_database_url() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/todos"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://localhost/todos");
        assert_eq!(database.max_connections, 4);
        assert_eq!(database.connect_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database, None);
    }

    #[test]
    fn invalid_number_is_reported() {
        let error = config_from(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidValue {
                name: "SERVER_PORT",
                value: "eighty".to_string(),
            }
        );
    }

    #[test]
    fn invalid_host_is_reported() {
        let config = config_from(&[("SERVER_HOST", "not a host")]).unwrap();
        assert!(matches!(
            config.server.bind_address(),
            Err(ConfigError::InvalidBindAddress(_))
        ));
    }
}

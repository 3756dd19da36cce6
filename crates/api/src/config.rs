//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres backend)
//! - `ECOMMERCE_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ECOMMERCE_STORE` - `postgres` (default) or `memory`
//! - `ECOMMERCE_HOST` - Bind address (default: 127.0.0.1)
//! - `ECOMMERCE_PORT` - Listen port (default: 8080)
//! - `ECOMMERCE_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `ECOMMERCE_EXPOSE_ERROR_DETAIL` - Put raw store errors in the `error`
//!   field of 500 responses (default: false)
//! - `ECOMMERCE_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which [`Store`](crate::db::Store) backs the API.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres {
        /// Connection URL (contains password)
        database_url: SecretString,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Include raw store errors in 500 responses
    pub expose_error_detail: bool,
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let store = match env.or_default("ECOMMERCE_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres {
                database_url: env
                    .get("ECOMMERCE_DATABASE_URL")
                    .or_else(|| env.get("DATABASE_URL"))
                    .map(SecretString::from)
                    .ok_or_else(|| {
                        ConfigError::MissingEnvVar("ECOMMERCE_DATABASE_URL".to_string())
                    })?,
                max_connections: env.parsed("ECOMMERCE_DB_MAX_CONNECTIONS", 10)?,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "ECOMMERCE_STORE".to_string(),
                    format!("expected `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        let log_format = match env.or_default("ECOMMERCE_LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "ECOMMERCE_LOG_FORMAT".to_string(),
                    format!("expected `text` or `json`, got `{other}`"),
                ));
            }
        };

        Ok(Self {
            store,
            host: env.parsed("ECOMMERCE_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parsed("ECOMMERCE_PORT", 8080)?,
            expose_error_detail: env.flag("ECOMMERCE_EXPOSE_ERROR_DETAIL")?,
            log_format,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Get the socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Unset and empty are both treated as absent.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key)
            .map_or_else(|| default.to_string(), |v| v.trim().to_ascii_lowercase())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.or_default(key, "false").as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got `{other}`"),
            )),
        }
    }
}

//! Shared configuration loader for CineHub services and clients
//!
//! Configuration is read from environment variables with the `CINEHUB_` prefix,
//! optionally seeded from a `.env` file. Override hierarchy is
//! defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use cinehub_core::config::{ConfigLoader, DatabaseConfig, ServiceConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! cinehub_core::config::load_dotenv();
//!
//! let db_config = DatabaseConfig::from_env()?;
//! let service_config = ServiceConfig::from_env()?;
//!
//! db_config.validate()?;
//! service_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::CineHubError;
use crate::observability::LogFormat;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a required variable is missing or a value
    /// cannot be parsed.
    fn from_env() -> Result<Self, CineHubError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), CineHubError>;
}

/// Database configuration
///
/// # Environment Variables
///
/// - `CINEHUB_DATABASE_URL` (required, falls back to `DATABASE_URL`)
/// - `CINEHUB_DATABASE_MAX_CONNECTIONS` (default: 20)
/// - `CINEHUB_DATABASE_MIN_CONNECTIONS` (default: 2)
/// - `CINEHUB_DATABASE_CONNECT_TIMEOUT` seconds (default: 30)
/// - `CINEHUB_DATABASE_IDLE_TIMEOUT` seconds (default: 600)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/cinehub".to_string(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, CineHubError> {
        let url = std::env::var("CINEHUB_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| CineHubError::ConfigurationError {
                message: "DATABASE_URL or CINEHUB_DATABASE_URL must be set".to_string(),
                key: Some("CINEHUB_DATABASE_URL".to_string()),
            })?;

        let defaults = DatabaseConfig::default();
        let max_connections =
            parse_env_var("CINEHUB_DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections =
            parse_env_var("CINEHUB_DATABASE_MIN_CONNECTIONS", defaults.min_connections)?;
        let connect_timeout_secs = parse_env_var("CINEHUB_DATABASE_CONNECT_TIMEOUT", 30u64)?;
        let idle_timeout_secs = parse_env_var("CINEHUB_DATABASE_IDLE_TIMEOUT", 600u64)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), CineHubError> {
        Url::parse(&self.url).map_err(|e| CineHubError::ConfigurationError {
            message: format!("Invalid DATABASE_URL: {}", e),
            key: Some("CINEHUB_DATABASE_URL".to_string()),
        })?;

        if self.max_connections == 0 {
            return Err(CineHubError::ConfigurationError {
                message: "max_connections must be greater than 0".to_string(),
                key: Some("CINEHUB_DATABASE_MAX_CONNECTIONS".to_string()),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(CineHubError::ConfigurationError {
                message: format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    self.min_connections, self.max_connections
                ),
                key: Some("CINEHUB_DATABASE_MIN_CONNECTIONS".to_string()),
            });
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(CineHubError::ConfigurationError {
                message: "connect_timeout must be greater than 0 seconds".to_string(),
                key: Some("CINEHUB_DATABASE_CONNECT_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// HTTP service configuration
///
/// # Environment Variables
///
/// - `CINEHUB_SERVICE_HOST` (default: "0.0.0.0", falls back to `HOST`)
/// - `CINEHUB_SERVICE_PORT` (default: 8080, falls back to `PORT`)
/// - `CINEHUB_SERVICE_WORKERS` (default: CPU count)
/// - `CINEHUB_SERVICE_LOG_LEVEL` (default: "info", falls back to `RUST_LOG`)
/// - `CINEHUB_SERVICE_LOG_FORMAT` "pretty" or "json" (default: "pretty")
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ConfigLoader for ServiceConfig {
    fn from_env() -> Result<Self, CineHubError> {
        let defaults = ServiceConfig::default();

        let host = std::env::var("CINEHUB_SERVICE_HOST")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or(defaults.host);

        let port = parse_env_var_or("CINEHUB_SERVICE_PORT", "PORT", defaults.port)?;

        let workers = parse_env_var("CINEHUB_SERVICE_WORKERS", defaults.workers)?;

        let log_level = std::env::var("CINEHUB_SERVICE_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        let log_format = parse_env_var("CINEHUB_SERVICE_LOG_FORMAT", defaults.log_format)?;

        Ok(Self {
            host,
            port,
            workers,
            log_level,
            log_format,
        })
    }

    fn validate(&self) -> Result<(), CineHubError> {
        if self.port == 0 {
            return Err(CineHubError::ConfigurationError {
                message: "port must be greater than 0".to_string(),
                key: Some("CINEHUB_SERVICE_PORT".to_string()),
            });
        }

        if self.workers == 0 {
            return Err(CineHubError::ConfigurationError {
                message: "workers must be greater than 0".to_string(),
                key: Some("CINEHUB_SERVICE_WORKERS".to_string()),
            });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(CineHubError::ConfigurationError {
                message: format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    valid_log_levels.join(", ")
                ),
                key: Some("CINEHUB_SERVICE_LOG_LEVEL".to_string()),
            });
        }

        Ok(())
    }
}

/// Token verification settings for the Synchronization API
///
/// # Environment Variables
///
/// - `CINEHUB_JWT_SECRET` (required): HS256 signing secret, at least 32 bytes
/// - `CINEHUB_JWT_ISSUER` (optional): expected `iss` claim
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: Option<String>,
}

const MIN_JWT_SECRET_LEN: usize = 32;

impl ConfigLoader for AuthConfig {
    fn from_env() -> Result<Self, CineHubError> {
        let jwt_secret =
            std::env::var("CINEHUB_JWT_SECRET").map_err(|_| CineHubError::ConfigurationError {
                message: "CINEHUB_JWT_SECRET must be set".to_string(),
                key: Some("CINEHUB_JWT_SECRET".to_string()),
            })?;

        let issuer = std::env::var("CINEHUB_JWT_ISSUER").ok();

        Ok(Self { jwt_secret, issuer })
    }

    fn validate(&self) -> Result<(), CineHubError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(CineHubError::ConfigurationError {
                message: format!(
                    "jwt_secret must be at least {} bytes",
                    MIN_JWT_SECRET_LEN
                ),
                key: Some("CINEHUB_JWT_SECRET".to_string()),
            });
        }
        Ok(())
    }
}

/// Client-side settings for talking to the Synchronization API
///
/// # Environment Variables
///
/// - `CINEHUB_API_BASE_URL` (default: "http://localhost:8080")
/// - `CINEHUB_API_TIMEOUT` seconds (default: 10)
/// - `CINEHUB_CACHE_PATH` (optional): SQLite file for the collection cache
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub cache_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(10),
            cache_path: None,
        }
    }
}

impl ConfigLoader for ClientConfig {
    fn from_env() -> Result<Self, CineHubError> {
        let defaults = ClientConfig::default();

        let api_base_url =
            std::env::var("CINEHUB_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let timeout_secs = parse_env_var("CINEHUB_API_TIMEOUT", 10u64)?;
        let cache_path = std::env::var("CINEHUB_CACHE_PATH").ok().map(PathBuf::from);

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_path,
        })
    }

    fn validate(&self) -> Result<(), CineHubError> {
        let url = Url::parse(&self.api_base_url).map_err(|e| CineHubError::ConfigurationError {
            message: format!("Invalid API base URL: {}", e),
            key: Some("CINEHUB_API_BASE_URL".to_string()),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CineHubError::ConfigurationError {
                message: format!("API base URL must be http or https, got {}", url.scheme()),
                key: Some("CINEHUB_API_BASE_URL".to_string()),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(CineHubError::ConfigurationError {
                message: "request_timeout must be greater than 0 seconds".to_string(),
                key: Some("CINEHUB_API_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is set but cannot be parsed
fn parse_env_var<T>(key: &str, default: T) -> Result<T, CineHubError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| CineHubError::ConfigurationError {
                    message: format!("Failed to parse {}: {}", key, e),
                    key: Some(key.to_string()),
                })
        })
        .unwrap_or(Ok(default))
}

/// Parse `key`, or `fallback` when `key` is unset
fn parse_env_var_or<T>(key: &str, fallback: &str, default: T) -> Result<T, CineHubError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if std::env::var(key).is_ok() {
        parse_env_var(key, default)
    } else {
        parse_env_var(fallback, default)
    }
}

/// Load .env file if present
///
/// A missing file is not an error.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}

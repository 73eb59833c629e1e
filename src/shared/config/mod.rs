//! Application configuration module
//!
//! Configuration is assembled in three layers, later layers winning:
//! built-in defaults, an optional TOML file, then environment variables.
//!
//! | key | env var | default |
//! |---|---|---|
//! | `database_url` | `DATABASE_URL` | none (in-memory store) |
//! | `jwt_secret` | `JWT_SECRET` | required by [`AppConfig::load`] |
//! | `server_port` | `SERVER_PORT` | `3000` |
//! | `token_ttl_hours` | `TOKEN_TTL_HOURS` | `720` (at most ten years) |
//!
//! `Default` and the builder fall back to a development secret so tests and
//! local tools need no setup. `load` refuses to start with it.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "TASKDECK_CONFIG";

const DEFAULT_JWT_SECRET: &str = "taskdeck-development-secret";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_HOURS: u64 = 30 * 24;
const MAX_TOKEN_TTL_HOURS: u64 = 10 * 365 * 24;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HMAC secret for JWT verification
    pub jwt_secret: String,
    /// Port the HTTP server binds to
    pub server_port: u16,
    /// Lifetime of issued tokens
    pub token_ttl_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            server_port: DEFAULT_PORT,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

/// Shape of the TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    server_port: Option<u16>,
    token_ttl_hours: Option<u64>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.token_ttl_hours == 0 || self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::InvalidValue {
                key: "token_ttl_hours",
                value: self.token_ttl_hours.to_string(),
            });
        }
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;
        let mut builder = Self::builder();
        builder.database_url = file.database_url;
        builder.jwt_secret = file.jwt_secret;
        builder.server_port = file.server_port;
        builder.token_ttl_hours = file.token_ttl_hours;
        builder.build()
    }

    /// Read a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load from `TASKDECK_CONFIG` (if set) and then the environment
    ///
    /// The JWT secret must come from the file or `JWT_SECRET`.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!("Loading configuration from {}", path);
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides()?;
        if config.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::error!("JWT_SECRET is not set");
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        Ok(config)
    }

    /// Apply `DATABASE_URL`, `JWT_SECRET`, `SERVER_PORT`, `TOKEN_TTL_HOURS`
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database_url = Some(url);
            }
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.server_port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "server_port",
                value: port.clone(),
            })?;
        }
        if let Ok(ttl) = std::env::var("TOKEN_TTL_HOURS") {
            self.token_ttl_hours = ttl.parse().map_err(|_| ConfigError::InvalidValue {
                key: "token_ttl_hours",
                value: ttl.clone(),
            })?;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    server_port: Option<u16>,
    token_ttl_hours: Option<u64>,
}

impl AppConfigBuilder {
    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    pub fn token_ttl_hours(mut self, hours: u64) -> Self {
        self.token_ttl_hours = Some(hours);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            database_url: self.database_url,
            jwt_secret: self.jwt_secret.unwrap_or(defaults.jwt_secret),
            server_port: self.server_port.unwrap_or(defaults.server_port),
            token_ttl_hours: self.token_ttl_hours.unwrap_or(defaults.token_ttl_hours),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

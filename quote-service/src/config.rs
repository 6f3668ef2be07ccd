//! Service configuration, read from environment variables.

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines for production.
    Json,
    /// Human-readable output for development.
    Pretty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API (the wizard host and product forms).
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    /// Pins the pricing year; the local clock is used when unset.
    pub reference_year: Option<i32>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            log_format: LogFormat::Json,
            reference_year: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or(defaults.cors_origins);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            Some("json") | None => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "LOG_FORMAT".to_string(),
                    message: format!("expected \"json\" or \"pretty\", got {other:?}"),
                });
            }
        };

        let reference_year = match lookup("QUOTE_REFERENCE_YEAR") {
            Some(raw) => Some(raw.parse::<i32>().map_err(|e| ConfigError::InvalidValue {
                key: "QUOTE_REFERENCE_YEAR".to_string(),
                message: format!("{raw:?}: {e}"),
            })?),
            None => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            log_format,
            reference_year,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

//! Process configuration loaded from the environment.

use axum::http::HeaderValue;
use thiserror::Error;

use catalog_observability::LogFormat;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// API server configuration.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub cors_origins: Vec<HeaderValue>,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            db_max_connections: 5,
            cors_origins: vec![HeaderValue::from_static("http://localhost:4200")],
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `HOST`               | `0.0.0.0`               |
    /// | `PORT`               | `8080`                  |
    /// | `DATABASE_URL`       | unset (in-memory store) |
    /// | `DB_MAX_CONNECTIONS` | `5`                     |
    /// | `CORS_ORIGINS`       | `http://localhost:4200` |
    /// | `LOG_FORMAT`         | `json`                  |
    ///
    /// `RUST_LOG` is read by the tracing subscriber, not here.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or(defaults.host);

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", &raw, e))?,
            None => defaults.port,
        };

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::invalid(
                        "DB_MAX_CONNECTIONS",
                        &raw,
                        "must be at least 1",
                    ));
                }
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("DB_MAX_CONNECTIONS", &raw, e)),
            },
            None => defaults.db_max_connections,
        };

        let cors_origins = match var("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|origin| {
                    HeaderValue::from_str(origin)
                        .map_err(|e| ConfigError::invalid("CORS_ORIGINS", origin, e))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.cors_origins,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", &raw, e))?,
            None => defaults.log_format,
        };

        Ok(Self {
            host,
            port,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            cors_origins,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

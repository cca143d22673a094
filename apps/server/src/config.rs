//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults.

use serde::{Deserialize, Serialize};
use std::env;

use till_core::types::TaxRate;
use till_core::validation::validate_tax_rate_bps;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Aggregate tax rate in basis points (1000 = 10%)
    pub tax_rate_bps: u32,

    /// Allowed CORS origins (comma-separated in the environment)
    pub cors_allow_origins: Vec<String>,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Operator login name
    pub operator_username: String,

    /// Operator password (hashed with argon2 at startup, never stored)
    pub operator_password: String,

    /// Sliding-window rate limit: events allowed per window per client
    pub rate_limit_max_requests: usize,

    /// Sliding-window rate limit: window length in seconds
    pub rate_limit_window_secs: u64,

    /// Whether unknown codes may pass through as custom items when the
    /// client declares a name and price
    pub allow_custom_items: bool,

    /// Shared secret for the payment webhook; the webhook rejects
    /// everything while unset
    pub webhook_secret: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "till.db".to_string()),

            tax_rate_bps: env::var("TAX_RATE_BPS")
                .unwrap_or_else(|_| "1000".to_string()) // 10%
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TAX_RATE_BPS".to_string()))?,

            cors_allow_origins: env::var("CORS_ALLOW_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // In production this MUST be set via environment variable
                "till-dev-secret-change-in-production".to_string()
            }),

            jwt_access_lifetime_secs: env::var("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            operator_username: env::var("OPERATOR_USERNAME")
                .unwrap_or_else(|_| "operator".to_string()),

            operator_password: env::var("OPERATOR_PASSWORD")
                .unwrap_or_else(|_| "operator-dev-password".to_string()),

            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_MAX_REQUESTS".to_string()))?,

            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_WINDOW_SECS".to_string()))?,

            allow_custom_items: env::var("ALLOW_CUSTOM_ITEMS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            webhook_secret: env::var("WEBHOOK_SECRET").ok(),
        };

        if validate_tax_rate_bps(config.tax_rate_bps).is_err() {
            return Err(ConfigError::InvalidValue("TAX_RATE_BPS".to_string()));
        }

        if config.rate_limit_max_requests == 0 || config.rate_limit_window_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "RATE_LIMIT_MAX_REQUESTS/RATE_LIMIT_WINDOW_SECS".to_string(),
            ));
        }

        Ok(config)
    }

    /// The configured aggregate tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}")]
    InvalidValue(String),

    #[error("missing required configuration: {0}")]
    MissingRequired(String),
}

impl Default for ServerConfig {
    /// Development defaults, identical to `load()` with an empty environment.
    fn default() -> Self {
        ServerConfig {
            http_port: 8000,
            database_path: "till.db".to_string(),
            tax_rate_bps: 1000,
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            jwt_secret: "till-dev-secret-change-in-production".to_string(),
            jwt_access_lifetime_secs: 3600,
            operator_username: "operator".to_string(),
            operator_password: "operator-dev-password".to_string(),
            rate_limit_max_requests: 60,
            rate_limit_window_secs: 60,
            allow_custom_items: false,
            webhook_secret: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_accessor() {
        let config = ServerConfig::default();
        assert_eq!(config.tax_rate().bps(), 1000);
    }
}

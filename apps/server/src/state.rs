//! Shared application state.
//!
//! One `AppState` is built at startup and cloned into every handler. All
//! fields are cheap to clone: the database holds a pooled connection set,
//! and the rest are behind `Arc`.

use std::sync::Arc;
use std::time::Duration;

use till_db::Database;

use crate::auth::{JwtManager, OperatorCredentials};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::rate_limit::RateLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (pooled).
    pub db: Database,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Token issue/validation.
    pub jwt: Arc<JwtManager>,

    /// Operator credential store (argon2-hashed at startup).
    pub credentials: Arc<OperatorCredentials>,

    /// Sliding-window request throttle.
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Builds the state from a connected database and loaded configuration.
    ///
    /// Hashes the operator password once, up front; the plaintext is not
    /// retained anywhere else.
    pub fn new(db: Database, config: ServerConfig) -> Result<Self, ApiError> {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
        let credentials =
            OperatorCredentials::new(&config.operator_username, &config.operator_password)?;
        let limiter = RateLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        );

        Ok(AppState {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            credentials: Arc::new(credentials),
            limiter: Arc::new(limiter),
        })
    }
}

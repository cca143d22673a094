//! JWT authentication module.
//!
//! Handles operator credential verification, JWT token generation and
//! validation, and the bearer-token extractor for protected routes.
//!
//! The checkout core never sees credentials: it receives only the
//! already-authenticated subject string.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Scopes granted to an operator on login.
pub const OPERATOR_SCOPE: &str = "sales reports";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (operator username)
    pub sub: String,

    /// Space-delimited granted scopes
    pub scope: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// Whether the token grants the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
        }
    }

    /// The configured access-token lifetime in seconds.
    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    /// Generate an access token for a verified subject.
    pub fn issue_access_token(&self, subject: &str, scope: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: subject.to_string(),
            scope: scope.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("failed to generate token: {e}")))
    }

    /// Validate and decode a token, extracting subject and scopes.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::auth(format!("invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}

/// Operator credentials, hashed once at startup.
///
/// The plaintext password from the environment is hashed with argon2 and
/// dropped; login attempts verify against the hash.
pub struct OperatorCredentials {
    username: String,
    password_hash: String,
}

impl OperatorCredentials {
    /// Hashes the configured password and builds the credential store.
    pub fn new(username: &str, password: &str) -> Result<Self, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::internal(format!("failed to hash credentials: {e}")))?
            .to_string();

        Ok(OperatorCredentials {
            username: username.to_string(),
            password_hash,
        })
    }

    /// Verifies a login attempt.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Extractors
// =============================================================================

/// Validated claims for a protected route.
///
/// ## Usage
/// ```rust,ignore
/// async fn summary(claims: AuthClaims, ...) -> ... {
///     claims.require_scope("reports")?;
/// }
/// ```
///
/// Use `Option<AuthClaims>` where authentication is optional: a missing
/// Authorization header yields `None`, but a present-and-invalid one is
/// still rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    /// The authenticated subject.
    pub fn subject(&self) -> &str {
        &self.0.sub
    }

    /// Fails with 401 unless the token grants the given scope.
    pub fn require_scope(&self, scope: &str) -> Result<(), ApiError> {
        if self.0.has_scope(scope) {
            Ok(())
        } else {
            Err(ApiError::auth(format!("token lacks required scope: {scope}")))
        }
    }
}

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::auth("missing bearer token"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::auth("malformed authorization header"))?;

        let claims = state.jwt.validate_token(token)?;
        Ok(AuthClaims(claims))
    }
}

impl OptionalFromRequestParts<AppState> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(None);
        }

        <AuthClaims as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow in Till POS                              │
//! │                                                                         │
//! │  CheckoutError (till-core) ──┐                                          │
//! │                              ├──► ApiError ──► JSON body + HTTP status  │
//! │  DbError (till-db) ──────────┘                                          │
//! │                                                                         │
//! │  Client receives:                                                       │
//! │  {                                                                      │
//! │    "error": {                                                           │
//! │      "code": "UNKNOWN_PRODUCT",                                         │
//! │      "message": "unknown product codes: 4999999999999",                 │
//! │      "details": { "codes": ["4999999999999"] }                          │
//! │    }                                                                    │
//! │  }                                                                      │
//! │                                                                         │
//! │  Storage failures are redacted: the real error goes to the log, the     │
//! │  client sees a generic message. Checkout failures are NOT redacted:     │
//! │  the client needs the offending codes to fix its order.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use till_core::CheckoutError;
use till_db::DbError;

/// API error returned from HTTP handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Structured context (offending codes, mismatched totals, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Seconds until a rate-limited client may retry (Retry-After header)
    #[serde(skip)]
    pub retry_after: Option<u64>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// One or more product codes not in the catalog (400)
    UnknownProduct,

    /// Client-declared totals disagree with the server (400)
    TotalMismatch,

    /// Authentication failed or token invalid (401)
    AuthFailed,

    /// Too many requests in the window (429)
    RateLimited,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
            retry_after: None,
        }
    }

    /// Attaches structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::AuthFailed, message)
    }

    /// Creates a rate-limited error with a retry hint.
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        let mut err = ApiError::new(
            ErrorCode::RateLimited,
            "too many requests, slow down".to_string(),
        );
        err.retry_after = Some(retry_after_secs);
        err
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::UnknownProduct | ErrorCode::TotalMismatch => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::AuthFailed => StatusCode::UNAUTHORIZED,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = self.retry_after;

        let mut response = (status, Json(json!({ "error": self }))).into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = header::HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Converts checkout errors to API errors.
///
/// Checkout failures carry their structure through to the client so the
/// offending line(s) are identifiable; never swallowed.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::UnknownProducts { codes } => {
                ApiError::new(ErrorCode::UnknownProduct, err.to_string())
                    .with_details(json!({ "codes": codes }))
            }
            CheckoutError::PriceMismatch { code } => ApiError::validation(err.to_string())
                .with_details(json!({ "code": code })),
            CheckoutError::TotalMismatch {
                field,
                declared,
                computed,
            } => ApiError::new(ErrorCode::TotalMismatch, err.to_string()).with_details(json!({
                "field": field,
                "declared": declared,
                "computed": computed,
            })),
            CheckoutError::EmptyOrder
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::QuantityTooLarge { .. }
            | CheckoutError::TooManyLines { .. }
            | CheckoutError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

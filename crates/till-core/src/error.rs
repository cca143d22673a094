//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                    │
//! │                                                                         │
//! │  till-core errors (this file)                                           │
//! │  ├── CheckoutError    - Order aggregation / pricing failures            │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  till-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  Server errors (apps/server)                                            │
//! │  └── ApiError         - What HTTP clients see (JSON body + status)      │
//! │                                                                         │
//! │  Flow: ValidationError → CheckoutError → DbError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (codes, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a client-facing message and status

use thiserror::Error;

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout pipeline errors.
///
/// Everything a purchase submission can get wrong before persistence.
/// These are surfaced to the client with enough structure to identify the
/// offending line(s); never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The submitted order had no lines at all.
    #[error("order must contain at least one line")]
    EmptyOrder,

    /// A line carried a quantity below 1.
    #[error("invalid quantity {quantity} for {code}: must be at least 1")]
    InvalidQuantity { code: String, quantity: i64 },

    /// A line's aggregated quantity exceeds the per-line maximum.
    #[error("quantity {requested} for {code} exceeds maximum allowed ({max})")]
    QuantityTooLarge {
        code: String,
        requested: i64,
        max: i64,
    },

    /// The order has more unique codes than a single transaction allows.
    #[error("order cannot have more than {max} unique lines")]
    TooManyLines { max: usize },

    /// One or more codes could not be resolved against the catalog.
    ///
    /// Carries EVERY missing code at once so the client can fix the whole
    /// order in one round trip, not discover failures one by one.
    #[error("unknown product codes: {}", codes.join(", "))]
    UnknownProducts { codes: Vec<String> },

    /// The client declared a name or unit price that contradicts the
    /// catalog record for a resolved code.
    ///
    /// ## When This Occurs
    /// A tampered client resubmits a stale or altered price. The catalog
    /// is authoritative for every code it resolves.
    #[error("declared name or price for {code} does not match the catalog")]
    PriceMismatch { code: String },

    /// A client-declared expected total disagrees with the server's
    /// computation. The server is the source of truth; declared totals are
    /// verification only and are rejected, never silently corrected.
    #[error("declared {field} {declared} does not match computed {computed}")]
    TotalMismatch {
        field: &'static str,
        declared: i64,
        computed: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a field doesn't meet format requirements, before any
/// business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be non-negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. a barcode that is not 13 digits).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

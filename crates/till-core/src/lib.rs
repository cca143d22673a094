//! # till-core: Pure Business Logic for Till POS
//!
//! This crate is the **heart** of Till POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    REST Clients (HTTP/JSON)                     │   │
//! │  │    GET /api/products/{code}  ·  POST /api/purchase  ·  ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    routing, auth, rate limiting, error mapping                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│   │   │
//! │  │   │  Product  │  │   Money   │  │ aggregate │  │   rules   │   │   │
//! │  │   │Transaction│  │  TaxRate  │  │  totals   │  │  checks   │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, TransactionLine)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`checkout`] - Line aggregation, catalog pricing, totals calculation
//! - [`error`] - Domain error types
//! - [`validation`] - Field format validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are minor units (i64); rounding
//!    happens exactly once, at the aggregate tax step
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use checkout::{
    AggregatedLine, DeclaredTotals, DraftSale, LineRequest, PricedLine, aggregate_lines,
    build_draft, compute_totals, price_lines, verify_declared_totals,
};
pub use error::{CheckoutError, ValidationError};
pub use money::Money;
pub use types::{Product, TaxRate, Transaction, TransactionLine};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default clerk attribution when the request supplies none.
pub const DEFAULT_CLERK_CODE: &str = "9999999999";

/// Default store attribution when the request supplies none.
pub const DEFAULT_STORE_CODE: &str = "30";

/// Default terminal attribution when the request supplies none.
pub const DEFAULT_TERMINAL_CODE: &str = "90";

/// Default aggregate tax rate in basis points (10%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;

/// Length of a product barcode (EAN-13-like).
pub const PRODUCT_CODE_LEN: usize = 13;

/// Maximum unique lines in a single transaction.
///
/// Prevents runaway orders and keeps transaction sizes reasonable.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum aggregated quantity of a single line.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

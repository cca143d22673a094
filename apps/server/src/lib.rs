//! # till-server: REST API for Till POS
//!
//! The HTTP layer over till-core (pure checkout logic) and till-db
//! (SQLite persistence).
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       POST /api/purchase                                │
//! │                                                                         │
//! │  CORS / TraceLayer                                                      │
//! │       │                                                                 │
//! │  rate_limit::limit ──────── sliding window per client key               │
//! │       │                                                                 │
//! │  Option<AuthClaims> ─────── optional bearer token → created_by          │
//! │       │                                                                 │
//! │  services::checkout ─────── aggregate → bulk lookup → price → totals    │
//! │       │                     (one atomic unit of work in till-db)        │
//! │       ▼                                                                 │
//! │  201 { transaction_id, subtotal, tax_amount, total, lines }             │
//! │  400 { error: { code, message, details } }                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::AppState;

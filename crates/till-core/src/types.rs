//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │     Product     │   │   Transaction   │   │  TransactionLine    │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  code (EAN-13)  │   │  id (UUID)      │   │  id (UUID)          │   │
//! │  │  name           │   │  subtotal       │   │  transaction_id(FK) │   │
//! │  │  unit_price     │   │  tax_amount     │   │  product snapshot   │   │
//! │  │                 │   │  total          │   │  quantity           │   │
//! │  │                 │   │  attribution    │   │  line_total         │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │     TaxRate     │   825 bps = 8.25%, 1000 bps = 10%                  │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `TransactionLine` copies the product's code, name and unit price at the
//! moment of sale. Historical transactions never change when the catalog does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (Japanese consumption tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, keyed by its barcode.
///
/// Reference data: seeded at startup, updated only by administrative
/// reseeding. The checkout flow reads it and never writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// EAN-13-like barcode: exactly 13 ASCII digits. Business identifier
    /// and primary key.
    pub code: String,

    /// Display name shown on receipts.
    pub name: String,

    /// Price in minor currency units.
    pub unit_price: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated (reseeded).
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.unit_price)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale transaction (header).
///
/// Created once, never mutated after commit except by deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Pre-tax total: the sum of all line totals.
    pub subtotal: i64,
    /// Tax on the aggregate subtotal, rounded half-up exactly once.
    pub tax_amount: i64,
    /// Tax-inclusive total: subtotal + tax_amount.
    pub total: i64,
    pub clerk_code: String,
    pub store_code: String,
    pub terminal_code: String,
    /// Authenticated actor subject, when the request carried a valid token.
    pub created_by: Option<String>,
}

impl Transaction {
    /// Returns the pre-tax subtotal as Money.
    #[inline]
    pub fn subtotal_money(&self) -> Money {
        Money::from_minor(self.subtotal)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax_money(&self) -> Money {
        Money::from_minor(self.tax_amount)
    }

    /// Returns the tax-inclusive total as Money.
    #[inline]
    pub fn total_money(&self) -> Money {
        Money::from_minor(self.total)
    }
}

// =============================================================================
// Transaction Line
// =============================================================================

/// A line item in a transaction.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionLine {
    pub id: String,
    pub transaction_id: String,
    /// Position within the transaction, following first-seen submission
    /// order of the aggregated codes.
    pub line_no: i64,
    /// Barcode at time of sale (frozen).
    pub product_code: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price in minor units at time of sale (frozen).
    pub unit_price: i64,
    /// Quantity sold (duplicate submissions are summed before this point).
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total: i64,
}

impl TransactionLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price_money(&self) -> Money {
        Money::from_minor(self.unit_price)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total_money(&self) -> Money {
        Money::from_minor(self.line_total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert!(!rate.is_zero());
        assert!(TaxRate::zero().is_zero());
    }

    #[test]
    fn test_tax_rate_default_is_ten_percent() {
        assert_eq!(TaxRate::default().bps(), 1000);
    }

    #[test]
    fn test_transaction_money_accessors() {
        let tx = Transaction {
            id: "t-1".to_string(),
            created_at: Utc::now(),
            subtotal: 350,
            tax_amount: 35,
            total: 385,
            clerk_code: crate::DEFAULT_CLERK_CODE.to_string(),
            store_code: crate::DEFAULT_STORE_CODE.to_string(),
            terminal_code: crate::DEFAULT_TERMINAL_CODE.to_string(),
            created_by: None,
        };
        assert_eq!(tx.subtotal_money() + tx.tax_money(), tx.total_money());
    }
}

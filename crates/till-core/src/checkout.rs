//! # Checkout Module
//!
//! The pure arithmetic half of a purchase: line aggregation, catalog
//! validation and totals calculation. Persistence lives in till-db; this
//! module never touches I/O.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Pipeline                                │
//! │                                                                         │
//! │  [{code, qty}, {code, qty}, ...]   (submission order)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  aggregate_lines() ── duplicates collapsed, quantities summed,          │
//! │       │               first-seen order preserved                        │
//! │       ▼                                                                 │
//! │  (bulk catalog lookup happens in till-db: ONE query for all codes)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_lines() ────── catalog is authoritative; unknown codes fail      │
//! │       │               all at once; declared prices must match           │
//! │       ▼                                                                 │
//! │  compute_totals() ─── subtotal = Σ line_total                           │
//! │       │               tax = round_half_up(subtotal × rate), ONCE        │
//! │       │               total = subtotal + tax                            │
//! │       ▼                                                                 │
//! │  DraftSale ────────── handed to the persister inside one DB transaction │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::validation::{validate_product_code, validate_product_name, validate_unit_price};
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

// =============================================================================
// Request Types
// =============================================================================

/// One submitted order line, as it arrives from the client.
///
/// `name` and `unit_price` are optional declarations. For codes the catalog
/// resolves they act as a tamper check; for unknown codes they supply the
/// data for a custom item, when the policy allows custom items at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub code: String,
    pub qty: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<i64>,
}

impl LineRequest {
    /// Convenience constructor for a plain code + quantity line.
    pub fn new(code: impl Into<String>, qty: i64) -> Self {
        LineRequest {
            code: code.into(),
            qty,
            name: None,
            unit_price: None,
        }
    }
}

/// An aggregated order line: one unique code with its summed quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedLine {
    pub code: String,
    pub quantity: i64,
    /// First-seen declared name among the merged submissions, if any.
    pub declared_name: Option<String>,
    /// First-seen declared unit price among the merged submissions, if any.
    pub declared_unit_price: Option<i64>,
}

/// A priced order line with its catalog (or custom-item) snapshot applied.
///
/// Serializes with the wire name `qty` for the quantity, matching the
/// request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub code: String,
    pub name: String,
    pub unit_price: i64,
    #[serde(rename = "qty")]
    pub quantity: i64,
    pub line_total: i64,
}

/// Client-declared expected totals, used for verification only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total: i64,
}

/// The finalized arithmetic of a sale, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSale {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total: i64,
    pub lines: Vec<PricedLine>,
}

// =============================================================================
// Line Aggregator
// =============================================================================

/// Collapses submitted lines into unique codes with summed quantities.
///
/// ## Behavior
/// - Iterates in submission order
/// - First occurrence of a code fixes its position in the output
/// - Quantities of duplicate codes are summed
/// - The first declared name/price for a code wins; later declarations for
///   the same code must not contradict it
///
/// ## Errors
/// - [`CheckoutError::EmptyOrder`] when the input is empty
/// - [`CheckoutError::InvalidQuantity`] when any quantity < 1
/// - [`CheckoutError::QuantityTooLarge`] when a summed quantity exceeds 999
/// - [`CheckoutError::TooManyLines`] above 100 unique codes
/// - [`CheckoutError::PriceMismatch`] when duplicate submissions of a code
///   declare contradictory names or prices
pub fn aggregate_lines(requests: &[LineRequest]) -> CheckoutResult<Vec<AggregatedLine>> {
    if requests.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    let mut aggregated: Vec<AggregatedLine> = Vec::new();
    let mut index_by_code: HashMap<String, usize> = HashMap::new();

    for request in requests {
        validate_product_code(&request.code)?;

        if request.qty < 1 {
            return Err(CheckoutError::InvalidQuantity {
                code: request.code.clone(),
                quantity: request.qty,
            });
        }

        if let Some(ref name) = request.name {
            validate_product_name(name)?;
        }
        if let Some(price) = request.unit_price {
            validate_unit_price(price)?;
        }

        match index_by_code.get(&request.code) {
            Some(&index) => {
                let line = &mut aggregated[index];
                line.quantity += request.qty;

                // Duplicate submissions may repeat the declaration, but they
                // must not contradict the first one.
                let name_conflict = matches!(
                    (&line.declared_name, &request.name),
                    (Some(a), Some(b)) if a != b
                );
                let price_conflict = matches!(
                    (line.declared_unit_price, request.unit_price),
                    (Some(a), Some(b)) if a != b
                );
                if name_conflict || price_conflict {
                    return Err(CheckoutError::PriceMismatch {
                        code: request.code.clone(),
                    });
                }
                if line.declared_name.is_none() {
                    line.declared_name = request.name.clone();
                }
                if line.declared_unit_price.is_none() {
                    line.declared_unit_price = request.unit_price;
                }
            }
            None => {
                if aggregated.len() >= MAX_ORDER_LINES {
                    return Err(CheckoutError::TooManyLines {
                        max: MAX_ORDER_LINES,
                    });
                }
                index_by_code.insert(request.code.clone(), aggregated.len());
                aggregated.push(AggregatedLine {
                    code: request.code.clone(),
                    quantity: request.qty,
                    declared_name: request.name.clone(),
                    declared_unit_price: request.unit_price,
                });
            }
        }
    }

    // Per-request quantities were each >= 1; the summed quantity still has
    // to respect the per-line cap.
    for line in &aggregated {
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(CheckoutError::QuantityTooLarge {
                code: line.code.clone(),
                requested: line.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
    }

    Ok(aggregated)
}

// =============================================================================
// Catalog Validator
// =============================================================================

/// Resolves aggregated lines against a pre-fetched catalog map.
///
/// The caller performs ONE bulk lookup for all codes (never a query per
/// code) and passes the result in; this function only decides what each
/// line's authoritative name and price are.
///
/// ## Resolution Rules
/// ```text
/// code in catalog?
///   yes ──► catalog name/price win.
///           declared name/price present? must match exactly, else
///           PriceMismatch (price-tampering defense).
///   no ───► custom items allowed AND name+price declared?
///             yes ──► pass through with the declared data
///             no ───► collected into UnknownProducts
/// ```
///
/// ## Errors
/// - [`CheckoutError::UnknownProducts`] listing EVERY unresolved code
/// - [`CheckoutError::PriceMismatch`] on a contradicted declaration
pub fn price_lines(
    aggregated: &[AggregatedLine],
    catalog: &HashMap<String, Product>,
    allow_custom_items: bool,
) -> CheckoutResult<Vec<PricedLine>> {
    let mut priced = Vec::with_capacity(aggregated.len());
    let mut unknown: Vec<String> = Vec::new();

    for line in aggregated {
        match catalog.get(&line.code) {
            Some(product) => {
                let name_mismatch = line
                    .declared_name
                    .as_ref()
                    .is_some_and(|name| name != &product.name);
                let price_mismatch = line
                    .declared_unit_price
                    .is_some_and(|price| price != product.unit_price);
                if name_mismatch || price_mismatch {
                    return Err(CheckoutError::PriceMismatch {
                        code: line.code.clone(),
                    });
                }

                priced.push(PricedLine {
                    code: product.code.clone(),
                    name: product.name.clone(),
                    unit_price: product.unit_price,
                    quantity: line.quantity,
                    line_total: Money::from_minor(product.unit_price)
                        .multiply_quantity(line.quantity)
                        .minor(),
                });
            }
            None => match (&line.declared_name, line.declared_unit_price) {
                (Some(name), Some(price)) if allow_custom_items => {
                    priced.push(PricedLine {
                        code: line.code.clone(),
                        name: name.clone(),
                        unit_price: price,
                        quantity: line.quantity,
                        line_total: Money::from_minor(price)
                            .multiply_quantity(line.quantity)
                            .minor(),
                    });
                }
                _ => unknown.push(line.code.clone()),
            },
        }
    }

    if !unknown.is_empty() {
        return Err(CheckoutError::UnknownProducts { codes: unknown });
    }

    Ok(priced)
}

// =============================================================================
// Totals Calculator
// =============================================================================

/// Computes the aggregate totals for a set of priced lines.
///
/// Tax is rounded half-up exactly once, on the aggregate subtotal, never
/// accumulated from per-line rounded taxes.
pub fn compute_totals(lines: &[PricedLine], tax_rate: TaxRate) -> (Money, Money, Money) {
    let subtotal = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + Money::from_minor(line.line_total));
    let tax_amount = subtotal.tax(tax_rate);
    let total = subtotal + tax_amount;
    (subtotal, tax_amount, total)
}

/// Verifies client-declared totals against the server's computation.
///
/// ## Errors
/// [`CheckoutError::TotalMismatch`] naming the first disagreeing component.
pub fn verify_declared_totals(
    declared: &DeclaredTotals,
    subtotal: Money,
    tax_amount: Money,
    total: Money,
) -> CheckoutResult<()> {
    let checks: [(&'static str, i64, i64); 3] = [
        ("subtotal", declared.subtotal, subtotal.minor()),
        ("tax_amount", declared.tax_amount, tax_amount.minor()),
        ("total", declared.total, total.minor()),
    ];

    for (field, declared_value, computed) in checks {
        if declared_value != computed {
            return Err(CheckoutError::TotalMismatch {
                field,
                declared: declared_value,
                computed,
            });
        }
    }

    Ok(())
}

/// Prices aggregated lines and finalizes the sale arithmetic.
///
/// The caller runs [`aggregate_lines`] first, performs the bulk catalog
/// lookup for the aggregated codes, then hands both results here.
///
/// ## Arguments
/// * `aggregated` - output of [`aggregate_lines`]
/// * `catalog` - result of the bulk catalog lookup for the unique codes
/// * `tax_rate` - configured aggregate tax rate
/// * `allow_custom_items` - whether unresolved codes may pass through with
///   client-declared data
/// * `declared` - optional client-declared totals to verify against
pub fn build_draft(
    aggregated: &[AggregatedLine],
    catalog: &HashMap<String, Product>,
    tax_rate: TaxRate,
    allow_custom_items: bool,
    declared: Option<&DeclaredTotals>,
) -> CheckoutResult<DraftSale> {
    let lines = price_lines(aggregated, catalog, allow_custom_items)?;
    let (subtotal, tax_amount, total) = compute_totals(&lines, tax_rate);

    if let Some(declared) = declared {
        verify_declared_totals(declared, subtotal, tax_amount, total)?;
    }

    Ok(DraftSale {
        subtotal: subtotal.minor(),
        tax_amount: tax_amount.minor(),
        total: total.minor(),
        lines,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

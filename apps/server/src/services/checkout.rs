//! # Checkout Service
//!
//! Orchestrates one purchase from submitted lines to a committed
//! transaction. Invoked by both the purchase route and the payment webhook.
//!
//! ## One Purchase, One Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_sale()                                                        │
//! │                                                                         │
//! │  aggregate_lines()          pure (till-core), cheap failures first      │
//! │       │                                                                 │
//! │  db.begin_unit()            BEGIN                                       │
//! │       │                                                                 │
//! │  unit.products_by_codes()   ONE bulk SELECT inside the transaction      │
//! │       │                                                                 │
//! │  build_draft()              pure: price, totals, declared-total check   │
//! │       │                     (errors drop the unit → automatic rollback) │
//! │       │                                                                 │
//! │  unit.insert_sale()         header + N lines                            │
//! │       │                                                                 │
//! │  unit.commit()              COMMIT                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use till_core::{
    aggregate_lines, build_draft, DeclaredTotals, LineRequest, PricedLine, Transaction,
    TransactionLine, DEFAULT_CLERK_CODE, DEFAULT_STORE_CODE, DEFAULT_TERMINAL_CODE,
};
use till_db::{generate_line_id, generate_transaction_id};

use crate::error::ApiError;
use crate::state::AppState;

/// A purchase submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    /// Order lines in submission order. Duplicate codes are aggregated.
    pub lines: Vec<LineRequest>,

    /// Attribution overrides; register defaults apply when absent.
    #[serde(default)]
    pub clerk_code: Option<String>,
    #[serde(default)]
    pub store_code: Option<String>,
    #[serde(default)]
    pub terminal_code: Option<String>,

    /// Client-declared expected totals, verified against the server's
    /// computation and rejected on any mismatch.
    #[serde(default)]
    pub expected: Option<DeclaredTotals>,
}

/// A registered sale, as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total: i64,
    /// Aggregated, priced lines in first-seen submission order.
    pub lines: Vec<PricedLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Registers a finalized sale.
///
/// The whole flow (catalog read, pricing, header + line writes) happens
/// inside one atomic unit of work. Any failure rolls everything back; no
/// partial transaction is ever observable.
///
/// ## Arguments
/// * `request` - the submitted purchase
/// * `created_by` - authenticated actor subject, when one was presented
pub async fn register_sale(
    state: &AppState,
    request: PurchaseRequest,
    created_by: Option<String>,
) -> Result<PurchaseResponse, ApiError> {
    // Pure validation and aggregation first: reject malformed orders
    // before touching the database at all.
    let aggregated = aggregate_lines(&request.lines)?;
    let codes: Vec<String> = aggregated.iter().map(|line| line.code.clone()).collect();

    let mut unit = state.db.begin_unit().await?;

    let catalog = unit.products_by_codes(&codes).await?;

    // Dropping `unit` on any error below rolls the unit of work back.
    let draft = build_draft(
        &aggregated,
        &catalog,
        state.config.tax_rate(),
        state.config.allow_custom_items,
        request.expected.as_ref(),
    )?;

    let transaction_id = generate_transaction_id();
    let now = Utc::now();

    let header = Transaction {
        id: transaction_id.clone(),
        created_at: now,
        subtotal: draft.subtotal,
        tax_amount: draft.tax_amount,
        total: draft.total,
        clerk_code: request
            .clerk_code
            .unwrap_or_else(|| DEFAULT_CLERK_CODE.to_string()),
        store_code: request
            .store_code
            .unwrap_or_else(|| DEFAULT_STORE_CODE.to_string()),
        terminal_code: request
            .terminal_code
            .unwrap_or_else(|| DEFAULT_TERMINAL_CODE.to_string()),
        created_by: created_by.clone(),
    };

    let lines: Vec<TransactionLine> = draft
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| TransactionLine {
            id: generate_line_id(),
            transaction_id: transaction_id.clone(),
            line_no: index as i64,
            product_code: line.code.clone(),
            product_name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total,
        })
        .collect();

    unit.insert_sale(&header, &lines).await?;
    unit.commit().await?;

    info!(
        transaction_id = %transaction_id,
        total = draft.total,
        lines = lines.len(),
        created_by = created_by.as_deref().unwrap_or("-"),
        "Sale registered"
    );

    Ok(PurchaseResponse {
        transaction_id,
        created_at: now,
        subtotal: draft.subtotal,
        tax_amount: draft.tax_amount,
        total: draft.total,
        lines: draft.lines,
        created_by,
    })
}

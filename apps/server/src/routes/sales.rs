//! Sale inspection and administration endpoints (auth required).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use till_core::{Transaction, TransactionLine};
use till_db::SalesSummary;

use crate::auth::AuthClaims;
use crate::error::ApiError;
use crate::state::AppState;

/// One persisted line, as exposed to clients.
#[derive(Debug, Serialize)]
pub struct SaleLineResponse {
    pub code: String,
    pub name: String,
    pub unit_price: i64,
    pub qty: i64,
    pub line_total: i64,
}

impl From<TransactionLine> for SaleLineResponse {
    fn from(line: TransactionLine) -> Self {
        SaleLineResponse {
            code: line.product_code,
            name: line.product_name,
            unit_price: line.unit_price,
            qty: line.quantity,
            line_total: line.line_total,
        }
    }
}

/// A persisted sale with its lines.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total: i64,
    pub clerk_code: String,
    pub store_code: String,
    pub terminal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub lines: Vec<SaleLineResponse>,
}

impl SaleResponse {
    fn from_parts(header: Transaction, lines: Vec<TransactionLine>) -> Self {
        SaleResponse {
            id: header.id,
            created_at: header.created_at,
            subtotal: header.subtotal,
            tax_amount: header.tax_amount,
            total: header.total,
            clerk_code: header.clerk_code,
            store_code: header.store_code,
            terminal_code: header.terminal_code,
            created_by: header.created_by,
            lines: lines.into_iter().map(SaleLineResponse::from).collect(),
        }
    }
}

/// `GET /api/sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<Json<SaleResponse>, ApiError> {
    claims.require_scope("reports")?;

    let (header, lines) = state
        .db
        .sales()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", &id))?;

    Ok(Json(SaleResponse::from_parts(header, lines)))
}

/// `DELETE /api/sales/{id}`
///
/// Removes a sale; its lines cascade with the header.
pub async fn delete_sale(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    claims.require_scope("sales")?;

    state.db.sales().delete(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sales/summary`
///
/// Aggregate figures over all persisted sales.
pub async fn sales_summary(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<Json<SalesSummary>, ApiError> {
    claims.require_scope("reports")?;

    let summary = state.db.sales().summary().await?;

    Ok(Json(summary))
}

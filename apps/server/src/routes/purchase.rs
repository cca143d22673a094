//! Purchase endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthClaims;
use crate::error::ApiError;
use crate::services::checkout::{register_sale, PurchaseRequest, PurchaseResponse};
use crate::state::AppState;

/// `POST /api/purchase`
///
/// Registers a sale: aggregates the submitted lines, prices them against
/// the catalog, computes tax-inclusive totals and persists header + lines
/// atomically. Returns 201 with the finalized figures.
///
/// Authentication is optional here: a valid bearer token stamps the
/// transaction with the operator's subject, a missing one falls back to
/// the attribution codes in the body, and an invalid one is rejected.
pub async fn post_purchase(
    State(state): State<AppState>,
    claims: Option<AuthClaims>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let created_by = claims.map(|claims| claims.subject().to_string());

    let response = register_sale(&state, request, created_by).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

//! Operator login: credentials in, bearer token out.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::OPERATOR_SCOPE;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// `POST /api/login`
///
/// Issues an access token for verified operator credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !state.credentials.verify(&request.username, &request.password) {
        warn!(username = %request.username, "Login rejected");
        return Err(ApiError::auth("invalid username or password"));
    }

    let access_token = state
        .jwt
        .issue_access_token(&request.username, OPERATOR_SCOPE)?;

    info!(username = %request.username, "Token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.jwt.access_lifetime_secs(),
    }))
}

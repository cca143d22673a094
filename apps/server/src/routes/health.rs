//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;

/// `GET /healthz`
///
/// Pings the database pool; a register that cannot reach its storage is
/// not healthy.
pub async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if !state.db.health_check().await {
        return Err(ApiError::new(
            ErrorCode::DatabaseError,
            "database unavailable",
        ));
    }

    Ok(Json(json!({ "status": "ok" })))
}

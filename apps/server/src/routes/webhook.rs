//! Payment-gateway webhook.
//!
//! The gateway confirms payment externally and notifies this endpoint;
//! registering the finalized transaction reuses the same checkout service
//! as a direct purchase. The server neither initiates nor verifies the
//! payment itself.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use till_core::LineRequest;

use crate::error::ApiError;
use crate::services::checkout::{register_sale, PurchaseRequest};
use crate::state::AppState;

/// Header carrying the shared webhook secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Event type that finalizes a sale.
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A payment-gateway event.
#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    /// Event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Gateway session identifier, kept for attribution.
    pub session_id: String,

    /// The paid-for lines as code→quantity pairs.
    #[serde(default)]
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// `POST /api/webhooks/payment`
///
/// Verifies the shared secret, then registers a finalized transaction for
/// a completed checkout session. Other event types are acknowledged and
/// ignored.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<PaymentEvent>,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiError> {
    let Some(expected) = state.config.webhook_secret.as_deref() else {
        warn!("Webhook event received but no webhook secret is configured");
        return Err(ApiError::auth("webhook not configured"));
    };

    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if presented != Some(expected) {
        warn!("Webhook event with missing or wrong secret");
        return Err(ApiError::auth("invalid webhook secret"));
    }

    if event.event_type != CHECKOUT_COMPLETED {
        info!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok((
            StatusCode::OK,
            Json(WebhookResponse {
                received: true,
                transaction_id: None,
            }),
        ));
    }

    let request = PurchaseRequest {
        lines: event.lines,
        clerk_code: None,
        store_code: None,
        terminal_code: None,
        expected: None,
    };

    let created_by = format!("gateway:{}", event.session_id);
    let response = register_sale(&state, request, Some(created_by)).await?;

    Ok((
        StatusCode::CREATED,
        Json(WebhookResponse {
            received: true,
            transaction_id: Some(response.transaction_id),
        }),
    ))
}

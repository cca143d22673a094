//! # HTTP Routes
//!
//! ## Surface
//! ```text
//! GET    /healthz                    liveness (public)
//! POST   /api/login                  credentials → bearer token (throttled)
//! GET    /api/products               full catalog (public)
//! GET    /api/products/{code}        one product or 404 (public)
//! POST   /api/purchase               register a sale (throttled, optional auth)
//! GET    /api/sales/summary          aggregate figures (auth: reports)
//! GET    /api/sales/{id}             sale with lines (auth: reports)
//! DELETE /api/sales/{id}             cascade delete (auth: sales)
//! POST   /api/webhooks/payment       payment-gateway callback (shared secret)
//! ```

pub mod health;
pub mod login;
pub mod products;
pub mod purchase;
pub mod sales;
pub mod webhook;

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::rate_limit;
use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    // Login and purchase are the abuse-prone endpoints; they share the
    // sliding-window throttle.
    let throttled = Router::new()
        .route("/api/login", post(login::login))
        .route("/api/purchase", post(purchase::post_purchase))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit,
        ));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{code}", get(products::get_product))
        .route("/api/sales/summary", get(sales::sales_summary))
        .route(
            "/api/sales/{id}",
            get(sales::get_sale).delete(sales::delete_sale),
        )
        .route("/api/webhooks/payment", post(webhook::payment_webhook))
        .merge(throttled)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer from the configured origin list.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

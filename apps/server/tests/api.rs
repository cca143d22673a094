//! End-to-end API tests: full router, in-memory database.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use till_db::{Database, DbConfig};
use till_server::{build_router, AppState, ServerConfig};

const CODE_A: &str = "4900000000001";
const CODE_B: &str = "4900000000002";
const CODE_UNKNOWN: &str = "4999999999999";

fn test_config() -> ServerConfig {
    ServerConfig {
        jwt_secret: "test-secret".to_string(),
        operator_username: "operator".to_string(),
        operator_password: "hunter2".to_string(),
        webhook_secret: Some("whsec-test".to_string()),
        ..ServerConfig::default()
    }
}

/// Catalog: A priced 100, B priced 150.
async fn test_server_with(config: ServerConfig) -> TestServer {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.products()
        .seed_catalog(
            &[(CODE_A, "Product A", 100), (CODE_B, "Product B", 150)],
            false,
        )
        .await
        .unwrap();

    let state = AppState::new(db, config).unwrap();
    TestServer::try_new(build_router(state)).unwrap()
}

async fn test_server() -> TestServer {
    test_server_with(test_config()).await
}

async fn operator_token(server: &TestServer) -> String {
    let response = server
        .post("/api/login")
        .json(&json!({ "username": "operator", "password": "hunter2" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

// =============================================================================
// Health & catalog
// =============================================================================

#[tokio::test]
async fn test_healthz() {
    let server = test_server().await;

    let response = server.get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_product_lookup() {
    let server = test_server().await;

    let response = server.get(&format!("/api/products/{CODE_A}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["code"], CODE_A);
    assert_eq!(body["name"], "Product A");
    assert_eq!(body["unit_price"], 100);

    // Unknown code is a structured 404, not a 200-null
    let missing = server.get("/api/products/0000000000000").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["error"]["code"], "NOT_FOUND");

    // Malformed code is a validation failure
    let malformed = server.get("/api/products/not-a-barcode").await;
    assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_list() {
    let server = test_server().await;

    let response = server.get("/api/products").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Purchase
// =============================================================================

#[tokio::test]
async fn test_purchase_end_to_end() {
    let server = test_server().await;

    // Purchase [{A,2},{B,1}] → pretax 350, tax 35 (10%), total 385
    let response = server
        .post("/api/purchase")
        .json(&json!({
            "lines": [
                { "code": CODE_A, "qty": 2 },
                { "code": CODE_B, "qty": 1 },
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["subtotal"], 350);
    assert_eq!(body["tax_amount"], 35);
    assert_eq!(body["total"], 385);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
    let transaction_id = body["transaction_id"].as_str().unwrap().to_string();

    // The persisted header has exactly 2 line rows, with default attribution
    let token = operator_token(&server).await;
    let sale = server
        .get(&format!("/api/sales/{transaction_id}"))
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(sale.status_code(), StatusCode::OK);
    let sale_body: Value = sale.json();
    assert_eq!(sale_body["lines"].as_array().unwrap().len(), 2);
    assert_eq!(sale_body["subtotal"], 350);
    assert_eq!(sale_body["clerk_code"], "9999999999");
    assert_eq!(sale_body["store_code"], "30");
    assert_eq!(sale_body["terminal_code"], "90");
    // Per-line snapshots hold the invariant line_total = unit_price × qty
    assert_eq!(sale_body["lines"][0]["line_total"], 200);
    assert_eq!(sale_body["lines"][1]["line_total"], 150);
}

#[tokio::test]
async fn test_purchase_aggregates_duplicate_lines() {
    let server = test_server().await;

    // {A,2} + {A,3} → ONE line with qty 5
    let response = server
        .post("/api/purchase")
        .json(&json!({
            "lines": [
                { "code": CODE_A, "qty": 2 },
                { "code": CODE_A, "qty": 3 },
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    let lines = body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["qty"], 5);
    assert_eq!(body["subtotal"], 500);
    assert_eq!(body["tax_amount"], 50);
    assert_eq!(body["total"], 550);
}

#[tokio::test]
async fn test_purchase_unknown_code_persists_nothing() {
    let server = test_server().await;
    let token = operator_token(&server).await;

    let response = server
        .post("/api/purchase")
        .json(&json!({
            "lines": [
                { "code": CODE_A, "qty": 1 },
                { "code": CODE_UNKNOWN, "qty": 1 },
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // The error names the exact offending code
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNKNOWN_PRODUCT");
    assert_eq!(body["error"]["details"]["codes"], json!([CODE_UNKNOWN]));

    // And zero rows were persisted
    let summary = server
        .get("/api/sales/summary")
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(summary.json::<Value>()["count"], 0);
}

#[tokio::test]
async fn test_purchase_empty_order_rejected() {
    let server = test_server().await;

    let response = server
        .post("/api/purchase")
        .json(&json!({ "lines": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "VALIDATION_ERROR"
    );
}

#[tokio::test]
async fn test_purchase_invalid_quantity_rejected() {
    let server = test_server().await;

    let response = server
        .post("/api/purchase")
        .json(&json!({ "lines": [{ "code": CODE_A, "qty": 0 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_declared_totals() {
    let server = test_server().await;

    // Server remains the source of truth: a wrong declared total is rejected
    let mismatch = server
        .post("/api/purchase")
        .json(&json!({
            "lines": [{ "code": CODE_A, "qty": 2 }],
            "expected": { "subtotal": 200, "tax_amount": 20, "total": 221 }
        }))
        .await;
    assert_eq!(mismatch.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = mismatch.json();
    assert_eq!(body["error"]["code"], "TOTAL_MISMATCH");
    assert_eq!(body["error"]["details"]["declared"], 221);
    assert_eq!(body["error"]["details"]["computed"], 220);

    // A matching declaration passes
    let ok = server
        .post("/api/purchase")
        .json(&json!({
            "lines": [{ "code": CODE_A, "qty": 2 }],
            "expected": { "subtotal": 200, "tax_amount": 20, "total": 220 }
        }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_purchase_rejects_tampered_price() {
    let server = test_server().await;

    let response = server
        .post("/api/purchase")
        .json(&json!({
            "lines": [{ "code": CODE_A, "qty": 1, "unit_price": 1 }]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_custom_item_behind_config_flag() {
    // Denied with the default config
    let server = test_server().await;
    let body = json!({
        "lines": [{ "code": CODE_UNKNOWN, "qty": 2, "name": "Gift wrapping", "unit_price": 50 }]
    });
    let denied = server.post("/api/purchase").json(&body).await;
    assert_eq!(denied.status_code(), StatusCode::BAD_REQUEST);

    // Allowed when the policy is on
    let server = test_server_with(ServerConfig {
        allow_custom_items: true,
        ..test_config()
    })
    .await;
    let allowed = server.post("/api/purchase").json(&body).await;
    assert_eq!(allowed.status_code(), StatusCode::CREATED);
    let body: Value = allowed.json();
    assert_eq!(body["subtotal"], 100);
    assert_eq!(body["lines"][0]["name"], "Gift wrapping");
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let server = test_server().await;

    let response = server
        .post("/api/login")
        .json(&json!({ "username": "operator", "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = test_server().await;

    let bare = server.get("/api/sales/summary").await;
    assert_eq!(bare.status_code(), StatusCode::UNAUTHORIZED);

    let garbage = server
        .get("/api/sales/summary")
        .add_header("authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(garbage.status_code(), StatusCode::UNAUTHORIZED);

    let token = operator_token(&server).await;
    let authed = server
        .get("/api/sales/summary")
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(authed.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_authenticated_purchase_is_attributed() {
    let server = test_server().await;
    let token = operator_token(&server).await;

    let response = server
        .post("/api/purchase")
        .add_header("authorization", format!("Bearer {token}"))
        .json(&json!({ "lines": [{ "code": CODE_B, "qty": 1 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["created_by"], "operator");

    let id = body["transaction_id"].as_str().unwrap();
    let sale = server
        .get(&format!("/api/sales/{id}"))
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(sale.json::<Value>()["created_by"], "operator");
}

#[tokio::test]
async fn test_invalid_token_on_purchase_rejected() {
    let server = test_server().await;

    // Optional auth still rejects a PRESENT but invalid token
    let response = server
        .post("/api/purchase")
        .add_header("authorization", "Bearer tampered.token.here")
        .json(&json!({ "lines": [{ "code": CODE_A, "qty": 1 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_sale_cascades() {
    let server = test_server().await;
    let token = operator_token(&server).await;

    let created = server
        .post("/api/purchase")
        .json(&json!({ "lines": [{ "code": CODE_A, "qty": 1 }] }))
        .await;
    let id = created.json::<Value>()["transaction_id"]
        .as_str()
        .unwrap()
        .to_string();

    let deleted = server
        .delete(&format!("/api/sales/{id}"))
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    let gone = server
        .get(&format!("/api/sales/{id}"))
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);

    let summary = server
        .get("/api/sales/summary")
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(summary.json::<Value>()["count"], 0);
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_over_threshold() {
    let server = test_server_with(ServerConfig {
        rate_limit_max_requests: 2,
        ..test_config()
    })
    .await;

    let body = json!({ "lines": [{ "code": CODE_A, "qty": 1 }] });

    for _ in 0..2 {
        let response = server.post("/api/purchase").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let limited = server.post("/api/purchase").json(&body).await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.json::<Value>()["error"]["code"], "RATE_LIMITED");
    assert!(limited.headers().get("retry-after").is_some());
}

#[tokio::test]
async fn test_rate_limit_keys_clients_separately() {
    let server = test_server_with(ServerConfig {
        rate_limit_max_requests: 1,
        ..test_config()
    })
    .await;

    let body = json!({ "lines": [{ "code": CODE_A, "qty": 1 }] });

    let first = server
        .post("/api/purchase")
        .add_header("x-forwarded-for", "10.0.0.1")
        .json(&body)
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    // Same client is now throttled...
    let same = server
        .post("/api/purchase")
        .add_header("x-forwarded-for", "10.0.0.1")
        .json(&body)
        .await;
    assert_eq!(same.status_code(), StatusCode::TOO_MANY_REQUESTS);

    // ...but a different client is not
    let other = server
        .post("/api/purchase")
        .add_header("x-forwarded-for", "10.0.0.2")
        .json(&body)
        .await;
    assert_eq!(other.status_code(), StatusCode::CREATED);
}

// =============================================================================
// Payment webhook
// =============================================================================

#[tokio::test]
async fn test_webhook_registers_completed_checkout() {
    let server = test_server().await;
    let token = operator_token(&server).await;

    let response = server
        .post("/api/webhooks/payment")
        .add_header("x-webhook-secret", "whsec-test")
        .json(&json!({
            "type": "checkout.session.completed",
            "session_id": "cs_123",
            "lines": [
                { "code": CODE_A, "qty": 2 },
                { "code": CODE_B, "qty": 1 },
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["received"], true);
    let id = body["transaction_id"].as_str().unwrap();

    // The registered transaction is attributed to the gateway session
    let sale = server
        .get(&format!("/api/sales/{id}"))
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    let sale_body: Value = sale.json();
    assert_eq!(sale_body["total"], 385);
    assert_eq!(sale_body["created_by"], "gateway:cs_123");
}

#[tokio::test]
async fn test_webhook_ignores_other_events() {
    let server = test_server().await;

    let response = server
        .post("/api/webhooks/payment")
        .add_header("x-webhook-secret", "whsec-test")
        .json(&json!({
            "type": "checkout.session.expired",
            "session_id": "cs_456"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["received"], true);
    assert!(body["transaction_id"].is_null());
}

#[tokio::test]
async fn test_webhook_rejects_bad_secret() {
    let server = test_server().await;

    let event = json!({
        "type": "checkout.session.completed",
        "session_id": "cs_789",
        "lines": [{ "code": CODE_A, "qty": 1 }]
    });

    let wrong = server
        .post("/api/webhooks/payment")
        .add_header("x-webhook-secret", "wrong")
        .json(&event)
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let missing = server.post("/api/webhooks/payment").json(&event).await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_disabled_without_secret() {
    let server = test_server_with(ServerConfig {
        webhook_secret: None,
        ..test_config()
    })
    .await;

    let response = server
        .post("/api/webhooks/payment")
        .add_header("x-webhook-secret", "whsec-test")
        .json(&json!({
            "type": "checkout.session.completed",
            "session_id": "cs_000",
            "lines": [{ "code": CODE_A, "qty": 1 }]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

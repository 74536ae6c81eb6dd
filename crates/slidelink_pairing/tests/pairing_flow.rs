//! End-to-end tests for the pairing HTTP contract.
//!
//! These drive the real router with in-process requests: register a device,
//! link it as a signed-in user, exchange the code for a token, and check the
//! status codes the extension's polling client keys off.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::{Extension, Router};
use serde_json::{json, Value};
use slidelink_common::models::UserIdentity;
use slidelink_common::services::SystemClock;
use slidelink_config::{AppConfig, PairingConfig, ServerConfig};
use slidelink_db::MemoryPairingAttemptRepository;
use slidelink_pairing::routes;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8086,
        },
        use_database: false,
        database: None,
        pairing: PairingConfig::default(),
    })
}

fn test_user() -> UserIdentity {
    UserIdentity {
        user_id: "u1".to_string(),
        user_email: "u1@example.com".to_string(),
    }
}

/// Router as seen by an anonymous caller (no session middleware ran).
fn anonymous_router() -> Router {
    routes(
        test_config(),
        Arc::new(MemoryPairingAttemptRepository::new()),
        Arc::new(SystemClock),
    )
}

/// Router behind a session layer that authenticates every request as `u1`.
fn signed_in_router() -> Router {
    anonymous_router().layer(Extension(test_user()))
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::String(
        String::from_utf8_lossy(&bytes).into_owned(),
    ));
    (status, value)
}

#[tokio::test]
async fn full_pairing_flow_over_http() {
    let router = signed_in_router();

    // Register
    let (status, registered) = post_json(&router, "/pairing/register", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let device_id = registered["deviceId"].as_str().unwrap().to_string();
    let code = registered["code"].as_str().unwrap().to_string();
    assert!(registered["expiresAt"].is_string());

    // Poll before linking: 425, the retryable status
    let (status, _) = post_json(
        &router,
        "/pairing/exchange",
        json!({"deviceId": device_id, "code": code}),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_EARLY);

    // Link as the signed-in user
    let (status, linked) = post_json(&router, "/pairing/link", json!({"code": code})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(linked["success"], json!(true));
    assert_eq!(linked["deviceId"].as_str().unwrap(), device_id);

    // Exchange succeeds once
    let (status, exchanged) = post_json(
        &router,
        "/pairing/exchange",
        json!({"deviceId": device_id, "code": code}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(exchanged["token"].as_str().unwrap().starts_with("slt_"));
    assert!(exchanged["expiresAt"].is_string());

    // The code is consumed; replay gets 404
    let (status, _) = post_json(
        &router,
        "/pairing/exchange",
        json!({"deviceId": device_id, "code": code}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn link_requires_a_session() {
    let router = anonymous_router();

    let (status, _) = post_json(&router, "/pairing/link", json!({"code": "XK4M2P"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn link_rejects_missing_code() {
    let router = signed_in_router();

    let (status, _) = post_json(&router, "/pairing/link", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&router, "/pairing/link", json!({"code": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_wrong_device_codes_map_to_the_contract() {
    let router = signed_in_router();

    // Unknown code: 404 for both link and exchange
    let (status, _) = post_json(&router, "/pairing/link", json!({"code": "ZZZZZZ"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = post_json(
        &router,
        "/pairing/exchange",
        json!({"deviceId": "d1", "code": "ZZZZZZ"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Wrong device on a real, linked code: 400
    let (_, registered) = post_json(&router, "/pairing/register", json!({})).await;
    let code = registered["code"].as_str().unwrap().to_string();
    post_json(&router, "/pairing/link", json!({"code": code})).await;

    let (status, _) = post_json(
        &router,
        "/pairing/exchange",
        json!({"deviceId": "someone-else", "code": code}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exchange_rejects_missing_parameters() {
    let router = signed_in_router();

    let (status, _) = post_json(&router, "/pairing/exchange", json!({"code": "XK4M2P"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&router, "/pairing/exchange", json!({"deviceId": "d1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn relinking_by_another_account_is_a_conflict() {
    let config = test_config();
    let repository = Arc::new(MemoryPairingAttemptRepository::new());
    let base = routes(config, repository, Arc::new(SystemClock));

    let as_u1 = base.clone().layer(Extension(test_user()));
    let as_u2 = base.layer(Extension(UserIdentity {
        user_id: "u2".to_string(),
        user_email: "u2@example.com".to_string(),
    }));

    let (_, registered) = post_json(&as_u1, "/pairing/register", json!({})).await;
    let code = registered["code"].as_str().unwrap().to_string();

    let (status, _) = post_json(&as_u1, "/pairing/link", json!({"code": code})).await;
    assert_eq!(status, StatusCode::OK);

    // Same account re-confirms
    let (status, _) = post_json(&as_u1, "/pairing/link", json!({"code": code})).await;
    assert_eq!(status, StatusCode::OK);

    // A different account is refused
    let (status, _) = post_json(&as_u2, "/pairing/link", json!({"code": code})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

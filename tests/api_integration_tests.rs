//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sharded_cache::{api::create_router, AppState, Config};
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let state = AppState::from_config(&Config::default()).unwrap();
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"test_key","value":"test_value"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_too_large() {
    let config = Config {
        max_payload_size_bytes: 8,
        ..Config::default()
    };
    let app = create_router(AppState::from_config(&config).unwrap());

    send(&app, "PUT", "/set", Some(r#"{"key":"k","value":"small"}"#)).await;
    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"k","value":"much too large"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["actual"], 14);
    assert_eq!(json["limit"], 8);

    // Prior value is untouched
    let (status, json) = send(&app, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "small");
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/set", Some(r#"{"key":"","value":"v"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Axum rejects malformed JSON bodies with a 4xx
    assert!(response.status().is_client_error());
}

// == GET / EXISTS / DELETE Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"get_key","value":"get_value"}"#)).await;
    let (status, json) = send(&app, "GET", "/get/get_key", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
    assert_eq!(json["found"], true);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/get/nonexistent_key", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

#[tokio::test]
async fn test_exists_and_delete_endpoints() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"gone","value":"soon"}"#)).await;

    let (_, json) = send(&app, "GET", "/exists/gone", None).await;
    assert_eq!(json["exists"], true);

    let (status, json) = send(&app, "DELETE", "/del/gone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);

    let (status, json) = send(&app, "DELETE", "/del/gone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], false);

    let (_, json) = send(&app, "GET", "/exists/gone", None).await;
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn test_key_routes_reject_oversized_key() {
    let app = create_test_app();
    let long_key = "k".repeat(257);

    for route in ["get", "exists", "del"] {
        let method = if route == "del" { "DELETE" } else { "GET" };
        let uri = format!("/{}/{}", route, long_key);

        let (status, json) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "route /{}", route);
        assert!(json["error"].as_str().unwrap().contains("maximum length"));
    }
}

// == COUNT / DUMP Endpoint Tests ==

#[tokio::test]
async fn test_count_and_dump_scenario() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"user:1","value":"A","ttl":60}"#)).await;
    send(&app, "PUT", "/set", Some(r#"{"key":"user:2","value":"B"}"#)).await;

    let (_, json) = send(&app, "GET", "/count", None).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["shards"], 4);

    let (status, json) = send(&app, "GET", "/dump", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["entries"],
        serde_json::json!({ "user:1": "A", "user:2": "B" })
    );
}

#[tokio::test]
async fn test_dump_include_expired() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"short","value":"x","ttl":1}"#)).await;
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (_, live) = send(&app, "GET", "/dump", None).await;
    assert!(live["entries"].as_object().unwrap().is_empty());

    let (_, all) = send(&app, "GET", "/dump?include_expired=true", None).await;
    assert_eq!(all["entries"]["short"], "x");
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == TTL Expiration via API Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"ttl_test","value":"v","ttl":1}"#)).await;

    let (status, _) = send(&app, "GET", "/get/ttl_test", None).await;
    assert_eq!(status, StatusCode::OK);

    // Wait for TTL to expire
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (status, _) = send(&app, "GET", "/get/ttl_test", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Lazy eviction on read corrected the count
    let (_, json) = send(&app, "GET", "/count", None).await;
    assert_eq!(json["count"], 0);
}

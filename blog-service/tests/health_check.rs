mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use blog_service::services::{init_metrics, InMemoryPostStore};
use blog_service::startup::Application;
use blog_service::{build_router, AppState};
use common::{app_with_memory_store, create_post, send, test_config};
use std::sync::Arc;
use serde_json::json;
use service_core::middleware::REQUEST_ID_HEADER;
use tower::util::ServiceExt;

#[tokio::test]
async fn diagnostics_lists_collections_when_store_is_connected() {
    let app = app_with_memory_store();
    create_post(&app, json!({ "title": "t", "content": "c" })).await;

    let (status, body) = send(&app, Method::GET, "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "✅ Connected & Working");
    assert_eq!(body["connection_status"], "Connected");
    assert_eq!(body["collections"], json!(["blogpost"]));
}

#[tokio::test]
async fn diagnostics_reports_env_presence_captured_at_load() {
    let mut config = test_config();
    config.database_url_set = true;
    let app = build_router(AppState::new(
        config,
        Some(Arc::new(InMemoryPostStore::default())),
    ));

    let (_, body) = send(&app, Method::GET, "/test", None).await;
    assert_eq!(body["database_url"], "✅ Set");
    assert_eq!(body["database_name"], "❌ Not Set");
}

#[tokio::test]
async fn cors_mirrors_the_request_origin() {
    let app = app_with_memory_store();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/posts")
                .header("origin", "https://pottery.example")
                .header("access-control-request-method", "PUT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://pottery.example"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn readiness_is_ok_with_a_store() {
    let app = app_with_memory_store();
    let (status, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = app_with_memory_store();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/hello")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    init_metrics();
    let app = app_with_memory_store();
    send(&app, Method::GET, "/api/hello", None).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn application_serves_on_a_random_port() {
    let app = Application::build_with_store(test_config(), None)
        .await
        .expect("Failed to build test application");
    let port = app.port();
    assert_ne!(port, 0);

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/api/hello", port);
    let mut response = None;
    for _ in 0..50 {
        if let Ok(r) = client.get(&url).send().await {
            response = Some(r);
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    let response = response.expect("server did not come up");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Hello from the backend API!");
}

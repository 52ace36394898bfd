#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use blog_service::config::BlogConfig;
use blog_service::services::{InMemoryPostStore, PostStore};
use blog_service::{build_router, AppState};
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::util::ServiceExt;

pub fn test_config() -> BlogConfig {
    BlogConfig {
        common: CoreConfig {
            port: 0,
            log_level: "error".to_string(),
        },
        mongodb: None,
        otlp_endpoint: None,
        database_url_set: false,
        database_name_set: false,
    }
}

/// Router backed by a fresh in-memory store.
pub fn app_with_memory_store() -> Router {
    app_with_store(Arc::new(InMemoryPostStore::new("blog_test")))
}

pub fn app_with_store(store: Arc<dyn PostStore>) -> Router {
    build_router(AppState::new(test_config(), Some(store)))
}

/// Router with no store configured.
pub fn app_without_store() -> Router {
    build_router(AppState::new(test_config(), None))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, value)
}

/// Creates a post and returns its id.
pub async fn create_post(app: &Router, body: Value) -> String {
    let (status, created) = send(app, Method::POST, "/api/posts", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", created);
    created["id"].as_str().expect("id in create response").to_string()
}

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::dtos::diagnostics::{
    env_presence, truncate_error, DiagnosticsResponse, MAX_LISTED_COLLECTIONS,
};
use crate::services::get_metrics;
use crate::startup::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Pottery Blog Backend Running" }))
}

pub async fn hello() -> impl IntoResponse {
    Json(json!({ "message": "Hello from the backend API!" }))
}

/// Liveness. Without a store the process is still considered alive.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let ping = match &state.store {
        Some(store) => store.health_check().await,
        None => Ok(()),
    };

    match ping {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "blog-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "blog-service",
                "error": e.to_string()
            })),
        ),
    }
}

pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match &state.store {
        Some(store) => match store.health_check().await {
            Ok(_) => StatusCode::OK,
            Err(_) => StatusCode::SERVICE_UNAVAILABLE,
        },
        None => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// `GET /test`: store connectivity, env var presence and collection names.
#[tracing::instrument(skip(state))]
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse::default();

    if let Some(store) = &state.store {
        tracing::debug!(database = %store.database_name(), "Inspecting document store");
        response.database = "✅ Available".to_string();
        response.connection_status = "Connected".to_string();

        match store.list_collection_names().await {
            Ok(mut collections) => {
                collections.truncate(MAX_LISTED_COLLECTIONS);
                response.collections = collections;
                response.database = "✅ Connected & Working".to_string();
            }
            Err(e) => {
                response.database =
                    format!("⚠️  Connected but Error: {}", truncate_error(&e.to_string()));
            }
        }
    }

    response.database_url = Some(env_presence(state.config.database_url_set));
    response.database_name = Some(env_presence(state.config.database_name_set));

    Json(response)
}

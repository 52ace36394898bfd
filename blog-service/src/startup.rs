//! Application startup and lifecycle management.

use crate::config::BlogConfig;
use crate::handlers;
use crate::services::{BlogDb, PostStore};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: BlogConfig,
    /// `None` means the document store is not configured.
    pub store: Option<Arc<dyn PostStore>>,
}

impl AppState {
    pub fn new(config: BlogConfig, store: Option<Arc<dyn PostStore>>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> Result<&dyn PostStore, AppError> {
        self.store.as_deref().ok_or(AppError::DatabaseNotConfigured)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/hello", get(handlers::hello))
        .route("/test", get(handlers::diagnostics))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/:id",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // route_layer so the matched route template is visible to the middleware
        .route_layer(from_fn(metrics_middleware))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Connects to MongoDB when configured. Failures leave the service running without a store.
pub async fn connect_store(config: &BlogConfig) -> Option<Arc<dyn PostStore>> {
    let Some(mongo) = &config.mongodb else {
        tracing::warn!("DATABASE_URL not set, running without a document store");
        return None;
    };

    let db = match BlogDb::connect(&mongo.uri, &mongo.database).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Document store unavailable, continuing without it: {}", e);
            return None;
        }
    };

    if let Err(e) = db.initialize_indexes().await {
        tracing::warn!("Failed to initialize database indexes: {}", e);
    }

    Some(Arc::new(db))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: BlogConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await;
        Self::build_with_store(config, store).await
    }

    /// Builds the application around an explicit store handle.
    pub async fn build_with_store(
        config: BlogConfig,
        store: Option<Arc<dyn PostStore>>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, store),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

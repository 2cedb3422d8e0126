//! HTTP API server.

pub mod routes;

use agrodoc_core::{AppError, AppResult};
use agrodoc_knowledge::Ingestor;
use agrodoc_rag::QueryOrchestrator;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QueryOrchestrator>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(orchestrator: Arc<QueryOrchestrator>, ingestor: Arc<Ingestor>) -> Self {
        Self {
            orchestrator,
            ingestor,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/query", post(routes::query))
        .route("/ingest", post(routes::ingest))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind and serve until the process is stopped.
pub async fn run(state: AppState, addr: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("AgroDoc API listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| AppError::Server(format!("Server error: {}", e)))
}

//! HTTP front end for the query service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/v1/query` | Answer a question about the site |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Query
//!
//! ```json
//! // request
//! { "query": "What do your plans cost?" }
//! // 200 response
//! { "response": "Plans start at $10/mo.", "sources": [{ "title": "Pricing Plans", "url": "/pricing" }] }
//! ```
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Query cannot be empty" } }
//! ```
//!
//! `bad_request` (400), `not_configured` (503), and the `upstream_*` codes
//! (500). Messages are always the sanitized user-facing text; see
//! [`ServiceError`].
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the chat widget can
//! be embedded on any page of the site.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use sitebot_core::models::Source;

use crate::config::Config;
use crate::error::ServiceError;
use crate::repository::create_repository;
use crate::service::QueryService;

/// Rebuild the index from the configured repository, then serve until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(QueryService::from_config(config)?);

    let repository = create_repository(config)?;
    let count = service.rebuild(repository.as_ref()).await?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        records = count,
        "sitebot listening"
    );

    axum::serve(listener, router(service)).await?;
    Ok(())
}

/// Build the application router around a ready service.
pub fn router(service: Arc<QueryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(service)
}

// ============ POST /v1/query ============

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub sources: Vec<Source>,
}

async fn handle_query(
    State(service): State<Arc<QueryService>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ServiceError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "malformed query body");
        ServiceError::Validation("Request body must be JSON with a `query` field".to_string())
    })?;

    let answer = service.answer(&request.query).await?;

    Ok(Json(QueryResponse {
        response: answer.answer,
        sources: answer.sources,
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

//! HTTP surface. Every route answers 200 with a JSON body; failures are
//! reported through `success: false`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use cognito_engine::api::{self, IngestRequest, IngestResponse, QueryRequest, QueryResponse, WELCOME};
use cognito_engine::KnowledgeEngine;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(engine: Arc<KnowledgeEngine>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/v1/knowledge/ingest", post(ingest))
        .route("/api/v1/knowledge/query", post(query))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME }))
}

// An unparseable body is treated like one with every field missing.
async fn ingest(
    State(engine): State<Arc<KnowledgeEngine>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Json<IngestResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable ingest body");
            IngestRequest::default()
        }
    };
    Json(api::ingest(&engine, request).await)
}

async fn query(
    State(engine): State<Arc<KnowledgeEngine>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Json<QueryResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable query body");
            QueryRequest::default()
        }
    };
    Json(api::query(&engine, request).await)
}

/// Serve until ctrl-c, then close the engine.
pub async fn serve(engine: Arc<KnowledgeEngine>, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "knowledge service listening");

    axum::serve(listener, router(Arc::clone(&engine)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    engine.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; shutting down");
    }
}

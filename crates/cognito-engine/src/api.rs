//! Request/response shapes for the HTTP surface and the handlers behind them.
//!
//! Handlers never return an error: every outcome, including bad input, maps to
//! a response body with `success` set accordingly.

use cognito_core::error::{Error, Result};
use cognito_core::types::{Article, SearchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::KnowledgeEngine;

pub const INGEST_OK: &str = "Article ingestion successful.";
pub const MISSING_ARTICLE_FIELDS: &str = "Missing article_id, title, or content.";
pub const MISSING_QUERY: &str = "No query provided.";
pub const WELCOME: &str = "Welcome to CognitoDesk Backend API";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl IngestRequest {
    pub fn into_article(self) -> Result<Article> {
        match (self.article_id, self.title, self.content) {
            (Some(id), Some(title), Some(content)) if !id.is_empty() && !title.is_empty() && !content.is_empty() => {
                Ok(Article::new(id, title, content))
            }
            _ => Err(Error::Validation(MISSING_ARTICLE_FIELDS.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_processed: Option<usize>,
}

impl IngestResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), chunks_processed: None }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Kept as raw JSON so a malformed `k` (string, float, negative) is
    /// reported as an invalid argument instead of failing the whole body.
    #[serde(default)]
    pub k: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
}

impl QueryResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), query: None, results: None }
    }
}

fn requested_k(k: Option<&Value>) -> Result<Option<usize>> {
    let Some(raw) = k else {
        return Ok(None);
    };
    match raw.as_i64() {
        Some(n) if n > 0 => usize::try_from(n)
            .map(Some)
            .map_err(|_| Error::InvalidArgument(format!("k = {n} is too large"))),
        _ => Err(Error::InvalidArgument(format!("k must be a positive integer, got {raw}"))),
    }
}

pub async fn ingest(engine: &KnowledgeEngine, request: IngestRequest) -> IngestResponse {
    let article = match request.into_article() {
        Ok(article) => article,
        Err(e) => {
            tracing::debug!(error = %e, "rejected ingest request");
            return IngestResponse::failure(MISSING_ARTICLE_FIELDS);
        }
    };
    match engine.ingest(&article).await {
        Ok(report) => IngestResponse {
            success: true,
            message: INGEST_OK.to_string(),
            chunks_processed: Some(report.chunk_count),
        },
        Err(e) => {
            tracing::warn!(article_id = %article.article_id, kind = e.kind(), error = %e, "ingest failed");
            IngestResponse::failure(e.to_string())
        }
    }
}

pub async fn query(engine: &KnowledgeEngine, request: QueryRequest) -> QueryResponse {
    let text = match request.query {
        Some(q) if !q.is_empty() => q,
        _ => return QueryResponse::failure(MISSING_QUERY),
    };
    let outcome = match requested_k(request.k.as_ref()) {
        Ok(k) => engine.search(&text, k).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(results) => QueryResponse { success: true, message: None, query: Some(text), results: Some(results) },
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "query failed");
            QueryResponse::failure(format!("Search failed: {e}"))
        }
    }
}

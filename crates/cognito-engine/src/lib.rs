use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use cognito_core::chunker::Chunker;
use cognito_core::config::Settings;
use cognito_core::error::{Error, Result};
use cognito_core::traits::{Embedder, VectorIndex};
use cognito_core::types::{Article, IndexRecord, IngestReport, SearchResult};
use cognito_embed::get_default_embedder;
use cognito_vector::LanceVectorIndex;

pub mod api;

static INGEST_SEQ: AtomicU64 = AtomicU64::new(0);

/// Chunker → Embedder → VectorIndex for ingestion, Embedder → VectorIndex for
/// search. Holds no mutable state of its own; share it behind an `Arc`.
pub struct KnowledgeEngine {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    default_k: usize,
}

impl KnowledgeEngine {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, default_k: usize) -> Result<Self> {
        if embedder.dim() != index.dim() {
            return Err(Error::InvalidConfig(format!(
                "embedder produces {}-dimensional vectors but the index stores {}",
                embedder.dim(),
                index.dim()
            )));
        }
        if default_k == 0 {
            return Err(Error::InvalidConfig("default k must be greater than 0".to_string()));
        }
        Ok(Self { chunker, embedder, index, default_k })
    }

    /// Build every collaborator from `settings` and attach the persistent store.
    pub async fn open(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let chunker = Chunker::new(settings.chunking)?;
        let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&settings.embedding)?);
        let index = Arc::new(LanceVectorIndex::from_settings(settings).await?);
        Self::new(chunker, embedder, index, settings.search.default_k)
    }

    /// Release the store. The engine should not be used afterwards.
    pub async fn close(&self) -> Result<()> {
        self.index.close().await
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Chunk, embed and store one article. All chunks are written in a single
    /// `add`, so they become searchable together or not at all.
    pub async fn ingest(&self, article: &Article) -> Result<IngestReport> {
        let chunks = self.chunker.split_article(article);
        if chunks.is_empty() {
            tracing::info!(article_id = %article.article_id, "article has no content; nothing to index");
            return Ok(IngestReport { article_id: article.article_id.clone(), chunk_count: 0 });
        }

        let tag = ingest_tag(&article.article_id);
        let mut records = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embed(&chunk.text)?;
            records.push(IndexRecord {
                id: format!("{}:{}:{}", article.article_id, tag, chunk.index),
                vector,
                text: chunk.text,
                metadata: chunk.metadata,
            });
        }

        let chunk_count = records.len();
        self.index.add(records).await?;
        tracing::info!(article_id = %article.article_id, title = %article.title, chunks = chunk_count, "ingested article");
        Ok(IngestReport { article_id: article.article_id.clone(), chunk_count })
    }

    /// Top `k` (default: the configured `default_k`) chunks closest to `query`.
    pub async fn search(&self, query: &str, k: Option<usize>) -> Result<Vec<SearchResult>> {
        let k = k.unwrap_or(self.default_k);
        if k == 0 {
            return Err(Error::InvalidArgument("k must be a positive integer".to_string()));
        }
        let vector = self.embed(query)?;
        let hits = self.index.query(&vector, k).await?;
        tracing::info!(k, hits = hits.len(), "search completed");
        Ok(hits.into_iter().map(SearchResult::from).collect())
    }

    pub async fn record_count(&self) -> Result<usize> {
        self.index.count().await
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text)?;
        if vector.len() != self.embedder.dim() {
            return Err(Error::Embedding(format!(
                "embedder returned {} values, expected {}",
                vector.len(),
                self.embedder.dim()
            )));
        }
        Ok(vector)
    }
}

/// Short digest distinguishing the records of one ingest call from any other
/// call for the same article id.
fn ingest_tag(article_id: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(article_id.as_bytes());
    hasher.update(&Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(&INGEST_SEQ.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    hasher.finalize().to_hex().as_str()[..12].to_string()
}

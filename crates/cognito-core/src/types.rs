//! Domain types shared by the chunker, the embedder, the vector index and the
//! engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RecordId = String;
pub type Meta = BTreeMap<String, String>;

/// Provenance tag attached to every chunk ingested through the engine.
pub const SOURCE_API_INGESTION: &str = "api_ingestion";

/// Ingestion input. Never persisted as a unit.
///
/// `article_id` is caller-supplied and not guaranteed to be unique: ingesting
/// the same id twice appends a second set of records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub article_id: String,
    pub title: String,
    pub content: String,
}

impl Article {
    pub fn new(article_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { article_id: article_id.into(), title: title.into(), content: content.into() }
    }

    /// Metadata every chunk of this article starts from.
    pub fn metadata(&self) -> Meta {
        let mut meta = Meta::new();
        meta.insert("source".to_string(), SOURCE_API_INGESTION.to_string());
        meta.insert("article_id".to_string(), self.article_id.clone());
        meta.insert("title".to_string(), self.title.clone());
        meta
    }
}

/// A contiguous piece of an article's content.
///
/// - `text`: the chunk payload, at most `chunk_size` characters
/// - `index`: position within the parent article (0-based)
/// - `start`: byte offset of `text` within the article content
/// - `overlap`: number of leading bytes of `text` shared with the previous chunk
/// - `metadata`: article metadata plus `chunk_index`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub start: usize,
    pub overlap: usize,
    pub metadata: Meta,
}

impl Chunk {
    /// The part of `text` not already covered by the previous chunk.
    pub fn fresh_text(&self) -> &str {
        &self.text[self.overlap..]
    }
}

/// A stored (vector, text, metadata) triple. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    pub id: RecordId,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: Meta,
}

/// An `IndexRecord` matched by a query together with its distance to the
/// query vector. Smaller distances are closer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: IndexRecord,
    pub distance: f32,
}

/// Projection of a matched record returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub content: String,
    pub metadata: Meta,
    pub distance: f32,
}

impl From<ScoredRecord> for SearchResult {
    fn from(hit: ScoredRecord) -> Self {
        Self { content: hit.record.text, metadata: hit.record.metadata, distance: hit.distance }
    }
}

/// Outcome of a successful ingest call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub article_id: String,
    pub chunk_count: usize,
}

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexRecord, ScoredRecord};

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic (same text, bit-identical vector for
/// the lifetime of the instance) and must always return `dim()` values.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Append-only store of `IndexRecord`s with nearest-neighbour lookup.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored vector has.
    fn dim(&self) -> usize;

    /// Persist all `records` or none of them.
    async fn add(&self, records: Vec<IndexRecord>) -> Result<()>;

    /// Up to `k` records, closest first. An empty store yields an empty list.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>>;

    async fn count(&self) -> Result<usize>;

    /// Release the underlying store. Further calls are not expected.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

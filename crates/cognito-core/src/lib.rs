//! Domain types, error taxonomy, collaborator traits, configuration and the
//! chunker for the Cognito knowledge base.

pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{Chunker, ChunkingConfig};
pub use config::{Metric, Settings};
pub use error::{Error, Result};
pub use traits::{Embedder, VectorIndex};
pub use types::{Article, Chunk, IndexRecord, IngestReport, Meta, ScoredRecord, SearchResult};

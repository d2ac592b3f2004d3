//! LanceDB-backed `VectorIndex`.
//!
//! Each collection is one Lance table inside the configured directory, so
//! several collections can share a directory. A batch passed to `add` is
//! validated up front and written as a single `RecordBatch`, which LanceDB
//! commits as one new table version: readers see all of it or none of it.

use arrow_array::RecordBatchIterator;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table};
use std::path::Path;
use tokio::sync::Mutex;

use cognito_core::config::{validate_collection_name, Metric, Settings};
use cognito_core::error::{Error, Result};
use cognito_core::traits::VectorIndex;
use cognito_core::types::{IndexRecord, ScoredRecord};

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

fn distance_type(metric: Metric) -> DistanceType {
    match metric {
        Metric::L2 => DistanceType::L2,
        Metric::Cosine => DistanceType::Cosine,
        Metric::Dot => DistanceType::Dot,
    }
}

pub struct LanceVectorIndex {
    db: Connection,
    table: Table,
    collection: String,
    dim: usize,
    metric: Metric,
    // Writes go through one table handle; serialize them so each add is a single commit.
    write_lock: Mutex<()>,
}

impl LanceVectorIndex {
    /// Attach to `collection` under `db_path`, creating the directory and the
    /// table on first use. Fails if the existing table stores vectors of a
    /// different dimension.
    pub async fn open(db_path: &Path, collection: &str, dim: usize, metric: Metric) -> Result<Self> {
        validate_collection_name(collection)?;
        let width = i32::try_from(dim)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| Error::InvalidConfig(format!("unsupported vector dimension {dim}")))?;
        std::fs::create_dir_all(db_path)
            .map_err(|e| Error::Storage(format!("cannot create {}: {e}", db_path.display())))?;

        let db = table::open_db(db_path.to_string_lossy().as_ref()).await?;
        let table = table::ensure_table(&db, collection, schema::build_records_schema(width)).await?;
        let existing = table.schema().await.map_err(Error::storage)?;
        match schema::vector_dim(&existing) {
            Some(d) if d == width => {}
            Some(d) => {
                return Err(Error::Storage(format!(
                    "collection '{collection}' stores {d}-dimensional vectors, embedder produces {dim}; use a fresh collection"
                )))
            }
            None => return Err(Error::Storage(format!("collection '{collection}' has no vector column"))),
        }

        tracing::info!(path = %db_path.display(), collection, dim, ?metric, "vector index attached");
        Ok(Self { db, table, collection: collection.to_string(), dim, metric, write_lock: Mutex::new(()) })
    }

    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        Self::open(
            &settings.storage.resolved_path(),
            &settings.storage.collection,
            settings.embedding.dimension,
            settings.storage.metric,
        )
        .await
    }

    /// Every collection stored in the same directory.
    pub async fn collections(&self) -> Result<Vec<String>> {
        self.db.table_names().execute().await.map_err(Error::storage)
    }
}

#[async_trait]
impl VectorIndex for LanceVectorIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn add(&self, records: Vec<IndexRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        writer::validate_records(&records, self.dim)?;
        // `dim` was checked to fit in i32 when the index was opened.
        let batch = writer::records_to_batch(&records, self.dim as i32)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));

        let _guard = self.write_lock.lock().await;
        self.table.add(reader).execute().await.map_err(Error::storage)?;
        tracing::debug!(collection = %self.collection, records = records.len(), "committed records");
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be a positive integer".to_string()));
        }
        if vector.len() != self.dim {
            return Err(Error::InvalidArgument(format!(
                "query vector has dimension {}, collection expects {}",
                vector.len(),
                self.dim
            )));
        }
        if self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let mut stream = self
            .table
            .vector_search(vector.to_vec())
            .map_err(Error::storage)?
            .distance_type(distance_type(self.metric))
            .limit(k)
            .execute()
            .await
            .map_err(Error::storage)?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::storage)? {
            hits.extend(search::batch_to_hits(&batch)?);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        self.table.count_rows(None).await.map_err(Error::storage)
    }

    async fn close(&self) -> Result<()> {
        // Every add is already committed; nothing is buffered on our side.
        tracing::info!(collection = %self.collection, "vector index closed");
        Ok(())
    }
}

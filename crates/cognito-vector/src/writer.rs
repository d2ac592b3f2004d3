use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use cognito_core::error::{Error, Result};
use cognito_core::types::IndexRecord;
use std::collections::HashSet;
use std::sync::Arc;

use crate::schema::build_records_schema;

/// Reject the whole batch if any record cannot be stored as-is.
pub(crate) fn validate_records(records: &[IndexRecord], dim: usize) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        if r.id.is_empty() {
            return Err(Error::Storage(format!("record {i} has an empty id")));
        }
        if !seen.insert(r.id.as_str()) {
            return Err(Error::Storage(format!("record id '{}' appears twice in one batch", r.id)));
        }
        if r.vector.len() != dim {
            return Err(Error::Storage(format!(
                "record '{}' has dimension {}, collection expects {}",
                r.id,
                r.vector.len(),
                dim
            )));
        }
        if r.vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::Storage(format!("record '{}' has a non-finite vector component", r.id)));
        }
    }
    Ok(())
}

pub(crate) fn records_to_batch(records: &[IndexRecord], dim: i32) -> Result<RecordBatch> {
    let schema = build_records_schema(dim);
    let now = Utc::now().timestamp_millis();
    let mut ids = Vec::with_capacity(records.len());
    let mut article_ids = Vec::with_capacity(records.len());
    let mut chunk_indices = Vec::with_capacity(records.len());
    let mut texts = Vec::with_capacity(records.len());
    let mut metas = Vec::with_capacity(records.len());
    let mut created = Vec::with_capacity(records.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(records.len());
    for r in records {
        ids.push(r.id.clone());
        article_ids.push(r.metadata.get("article_id").cloned());
        chunk_indices.push(r.metadata.get("chunk_index").and_then(|v| v.parse::<i32>().ok()));
        texts.push(r.text.clone());
        metas.push(serde_json::to_string(&r.metadata).map_err(Error::storage)?);
        created.push(now);
        vectors.push(Some(r.vector.iter().map(|&x| Some(x)).collect()));
    }
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(article_ids)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(metas)),
            Arc::new(TimestampMillisecondArray::from(created)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
        ],
    )
    .map_err(Error::storage)
}

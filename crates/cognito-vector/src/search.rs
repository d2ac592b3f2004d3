use arrow_array::cast::AsArray;
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, StringArray};
use cognito_core::error::{Error, Result};
use cognito_core::types::{IndexRecord, Meta, ScoredRecord};

use crate::schema::{COL_DISTANCE, COL_ID, COL_METADATA, COL_TEXT, COL_VECTOR};

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::Storage(format!("result batch is missing string column '{name}'")))
}

/// Decode one vector-search result batch into scored records.
pub(crate) fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<ScoredRecord>> {
    let ids = string_col(batch, COL_ID)?;
    let texts = string_col(batch, COL_TEXT)?;
    let metas = string_col(batch, COL_METADATA)?;
    let distances = batch
        .column_by_name(COL_DISTANCE)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| Error::Storage(format!("result batch is missing '{COL_DISTANCE}'")))?;
    let vectors = batch.column_by_name(COL_VECTOR).and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>());

    let mut hits = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let metadata: Meta = serde_json::from_str(metas.value(i))
            .map_err(|e| Error::Storage(format!("corrupt metadata for record '{}': {e}", ids.value(i))))?;
        let vector = match vectors {
            Some(v) if v.is_valid(i) => v.value(i).as_primitive::<arrow_array::types::Float32Type>().values().to_vec(),
            _ => Vec::new(),
        };
        hits.push(ScoredRecord {
            record: IndexRecord { id: ids.value(i).to_string(), vector, text: texts.value(i).to_string(), metadata },
            distance: distances.value(i),
        });
    }
    Ok(hits)
}

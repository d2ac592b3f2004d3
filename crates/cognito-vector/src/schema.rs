use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

pub const COL_ID: &str = "id";
pub const COL_ARTICLE_ID: &str = "article_id";
pub const COL_CHUNK_INDEX: &str = "chunk_index";
pub const COL_TEXT: &str = "text";
pub const COL_METADATA: &str = "metadata";
pub const COL_CREATED_AT: &str = "created_at";
pub const COL_VECTOR: &str = "vector";
/// Added by LanceDB to vector search results.
pub const COL_DISTANCE: &str = "_distance";

/// Schema of a collection table. `metadata` holds the record's metadata map as
/// JSON; `article_id` and `chunk_index` are lifted out of it when present.
pub fn build_records_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(COL_ID, DataType::Utf8, false),
        Field::new(COL_ARTICLE_ID, DataType::Utf8, true),
        Field::new(COL_CHUNK_INDEX, DataType::Int32, true),
        Field::new(COL_TEXT, DataType::Utf8, false),
        Field::new(COL_METADATA, DataType::Utf8, false),
        Field::new(COL_CREATED_AT, DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new(COL_VECTOR, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
    ]))
}

/// Width of the `vector` column, if the schema has one.
pub fn vector_dim(schema: &Schema) -> Option<i32> {
    match schema.field_with_name(COL_VECTOR).ok()?.data_type() {
        DataType::FixedSizeList(_, n) => Some(*n),
        _ => None,
    }
}

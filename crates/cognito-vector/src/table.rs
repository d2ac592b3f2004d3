//! LanceDB connection and table housekeeping helpers.

use arrow_array::RecordBatchIterator;
use cognito_core::error::{Error, Result};
use lancedb::{connect, Connection, Table};
use std::sync::Arc;

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(Error::storage)
}

/// Open `name`, creating it empty with `schema` when it does not exist yet.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<Table> {
    let names = conn.table_names().execute().await.map_err(Error::storage)?;
    if !names.iter().any(|n| n == name) {
        let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
        conn.create_table(name, Box::new(iter)).execute().await.map_err(Error::storage)?;
        tracing::info!(table = name, "created collection table");
    }
    conn.open_table(name).execute().await.map_err(Error::storage)
}

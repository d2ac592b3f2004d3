use cognito_core::config::Metric;
use cognito_core::traits::VectorIndex;
use cognito_core::types::{IndexRecord, Meta};
use cognito_core::Error;
use cognito_vector::LanceVectorIndex;
use tempfile::TempDir;

const DIM: usize = 4;

fn record(id: &str, article_id: &str, vector: [f32; DIM]) -> IndexRecord {
    let mut metadata = Meta::new();
    metadata.insert("source".to_string(), "api_ingestion".to_string());
    metadata.insert("article_id".to_string(), article_id.to_string());
    metadata.insert("title".to_string(), format!("title of {article_id}"));
    IndexRecord { id: id.to_string(), vector: vector.to_vec(), text: format!("text of {id}"), metadata }
}

async fn open(tmp: &TempDir, collection: &str) -> LanceVectorIndex {
    LanceVectorIndex::open(tmp.path(), collection, DIM, Metric::L2).await.expect("open index")
}

#[tokio::test]
async fn empty_collection_returns_no_hits() {
    let tmp = TempDir::new().expect("tmp");
    let index = open(&tmp, "kb").await;
    assert_eq!(index.count().await.expect("count"), 0);
    let hits = index.query(&[1.0, 0.0, 0.0, 0.0], 3).await.expect("query");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn fewer_records_than_k_returns_all_closest_first() {
    let tmp = TempDir::new().expect("tmp");
    let index = open(&tmp, "kb").await;
    index
        .add(vec![record("far", "a2", [0.0, 0.0, 3.0, 0.0]), record("near", "a1", [1.0, 0.1, 0.0, 0.0])])
        .await
        .expect("add");

    let hits = index.query(&[1.0, 0.0, 0.0, 0.0], 5).await.expect("query");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].record.id, "near");
    assert_eq!(hits[1].record.id, "far");
    assert!(hits[0].distance <= hits[1].distance);
}

#[tokio::test]
async fn exact_vector_is_distance_zero_and_metadata_round_trips() {
    let tmp = TempDir::new().expect("tmp");
    let index = open(&tmp, "kb").await;
    let stored = record("a1:x:0", "a1", [0.5, 0.5, 0.5, 0.5]);
    index.add(vec![stored.clone(), record("a2:x:0", "a2", [-0.5, 0.5, -0.5, 0.5])]).await.expect("add");

    let hits = index.query(&stored.vector, 1).await.expect("query");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].distance.abs() < 1e-6, "distance = {}", hits[0].distance);
    assert_eq!(hits[0].record.text, stored.text);
    assert_eq!(hits[0].record.metadata, stored.metadata);
    assert_eq!(hits[0].record.vector, stored.vector);
}

#[tokio::test]
async fn invalid_record_rejects_the_whole_batch() {
    let tmp = TempDir::new().expect("tmp");
    let index = open(&tmp, "kb").await;
    let mut bad = record("c", "a1", [0.0; DIM]);
    bad.vector.push(1.0);
    let batch = vec![record("a", "a1", [1.0, 0.0, 0.0, 0.0]), record("b", "a1", [0.0, 1.0, 0.0, 0.0]), bad];

    let err = index.add(batch).await.expect_err("batch with a 5-d vector must fail");
    assert!(matches!(err, Error::Storage(_)), "got {err:?}");
    assert_eq!(index.count().await.expect("count"), 0, "no record of the failed batch is committed");
    assert!(index.query(&[1.0, 0.0, 0.0, 0.0], 3).await.expect("query").is_empty());
}

#[tokio::test]
async fn duplicate_ids_in_one_batch_are_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let index = open(&tmp, "kb").await;
    let batch = vec![record("same", "a1", [1.0, 0.0, 0.0, 0.0]), record("same", "a1", [0.0, 1.0, 0.0, 0.0])];
    assert!(index.add(batch).await.is_err());
    assert_eq!(index.count().await.expect("count"), 0);
}

#[tokio::test]
async fn records_survive_reopen() {
    let tmp = TempDir::new().expect("tmp");
    {
        let index = open(&tmp, "kb").await;
        index.add(vec![record("r1", "a1", [1.0, 0.0, 0.0, 0.0])]).await.expect("add");
        index.close().await.expect("close");
    }
    let index = open(&tmp, "kb").await;
    assert_eq!(index.count().await.expect("count"), 1);
    let hits = index.query(&[1.0, 0.0, 0.0, 0.0], 3).await.expect("query");
    assert_eq!(hits[0].record.id, "r1");
}

#[tokio::test]
async fn reopening_with_another_dimension_fails() {
    let tmp = TempDir::new().expect("tmp");
    open(&tmp, "kb").await;
    let err = LanceVectorIndex::open(tmp.path(), "kb", DIM * 2, Metric::L2).await.err().expect("dimension mismatch");
    assert!(matches!(err, Error::Storage(_)), "got {err:?}");
}

#[tokio::test]
async fn collections_in_one_directory_do_not_collide() {
    let tmp = TempDir::new().expect("tmp");
    let first = open(&tmp, "articles").await;
    let second = open(&tmp, "faq").await;
    first.add(vec![record("a", "a1", [1.0, 0.0, 0.0, 0.0])]).await.expect("add");

    assert_eq!(first.count().await.expect("count"), 1);
    assert_eq!(second.count().await.expect("count"), 0);
    let mut names = first.collections().await.expect("collections");
    names.sort();
    assert_eq!(names, vec!["articles".to_string(), "faq".to_string()]);
}

#[tokio::test]
async fn zero_k_and_wrong_query_dimension_are_invalid_arguments() {
    let tmp = TempDir::new().expect("tmp");
    let index = open(&tmp, "kb").await;
    let err = index.query(&[1.0, 0.0, 0.0, 0.0], 0).await.expect_err("k = 0");
    assert!(matches!(err, Error::InvalidArgument(_)));
    let err = index.query(&[1.0, 0.0], 1).await.expect_err("2-d query");
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn cosine_metric_ranks_by_angle() {
    let tmp = TempDir::new().expect("tmp");
    let index = LanceVectorIndex::open(tmp.path(), "kb", DIM, Metric::Cosine).await.expect("open");
    index
        .add(vec![record("long-same-direction", "a1", [10.0, 0.0, 0.0, 0.0]), record("short-other", "a2", [0.0, 0.5, 0.0, 0.0])])
        .await
        .expect("add");
    let hits = index.query(&[1.0, 0.0, 0.0, 0.0], 2).await.expect("query");
    assert_eq!(hits[0].record.id, "long-same-direction");
}

#[tokio::test]
async fn invalid_collection_name_is_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let err = LanceVectorIndex::open(tmp.path(), "../outside", DIM, Metric::L2).await.err().expect("bad name");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

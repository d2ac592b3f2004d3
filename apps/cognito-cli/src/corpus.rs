//! Bulk ingestion of a directory of `.txt` files.

use std::fs;
use std::path::{Path, PathBuf};

use cognito_core::types::Article;
use cognito_engine::KnowledgeEngine;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};

/// All `.txt` files under `root`, recursively, in path order.
pub fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}

/// The file stem doubles as article id and title.
pub fn article_from_file(path: &Path) -> anyhow::Result<Article> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("{} has no usable file name", path.display()))?;
    let content = fs::read_to_string(path)?;
    Ok(Article::new(stem, stem, content))
}

/// Ingest every `.txt` file under `dir`. A file that fails is reported and
/// skipped; the others still go in.
pub async fn ingest_dir(engine: &KnowledgeEngine, dir: &Path) -> anyhow::Result<Value> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    let files = list_txt_files(dir);
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );

    let mut articles = 0usize;
    let mut chunks = 0usize;
    let mut failures = Vec::new();
    for path in &files {
        pb.set_message(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        let outcome = match article_from_file(path) {
            Ok(article) => engine.ingest(&article).await.map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(report) => {
                articles += 1;
                chunks += report.chunk_count;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                failures.push(json!({ "path": path.display().to_string(), "error": e.to_string() }));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(json!({
        "success": failures.is_empty(),
        "articles": articles,
        "chunks_processed": chunks,
        "failures": failures,
    }))
}

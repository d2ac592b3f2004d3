//! `cognito`: ingest articles into the knowledge base, query it, or serve it
//! over HTTP.
//!
//! Usage:
//!   cognito ingest --id a1 --title Cats --content "Cats are independent."
//!   cognito ingest-dir ./articles
//!   cognito query "how do cats behave" -k 5
//!   cognito stats
//!   cognito serve --port 8000

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cognito_core::config::Settings;
use cognito_engine::api::{self, IngestRequest, QueryRequest};
use cognito_engine::KnowledgeEngine;
use cognito_cli::{corpus, server};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cognito", version, about = "Knowledge-base ingestion and semantic search")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, embed and store one article
    Ingest {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        /// Article body
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,
        /// Read the article body from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Ingest every .txt file under a directory (file stem = id and title)
    IngestDir { dir: PathBuf },
    /// Return the chunks closest to a query
    Query {
        text: String,
        #[arg(short)]
        k: Option<i64>,
    },
    /// Show the record count and storage location
    Stats,
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "cognito_cli=debug,cognito_engine=debug,cognito_vector=debug,tower_http=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load()?;
    let engine = Arc::new(KnowledgeEngine::open(&settings).await?);

    match cli.command {
        Command::Ingest { id, title, content, file } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => fs::read_to_string(&path)?,
                (None, None) => anyhow::bail!("either --content or --file is required"),
            };
            let request = IngestRequest { article_id: Some(id), title: Some(title), content: Some(content) };
            print_json(&serde_json::to_value(api::ingest(&engine, request).await)?)?;
        }
        Command::IngestDir { dir } => {
            print_json(&corpus::ingest_dir(&engine, &dir).await?)?;
        }
        Command::Query { text, k } => {
            let response = api::query(&engine, QueryRequest { query: Some(text), k: k.map(Value::from) }).await;
            print_json(&serde_json::to_value(response)?)?;
        }
        Command::Stats => {
            print_json(&json!({
                "path": settings.storage.resolved_path().display().to_string(),
                "collection": settings.storage.collection,
                "metric": settings.storage.metric,
                "dimension": settings.embedding.dimension,
                "records": engine.record_count().await?,
            }))?;
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            // `serve` closes the engine itself after shutdown.
            return server::serve(engine, &host, port).await;
        }
    }

    engine.close().await?;
    Ok(())
}

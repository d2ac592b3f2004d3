use cognito_core::chunker::{Chunker, ChunkingConfig};
use cognito_core::config::{Metric, Settings};
use cognito_core::types::{Article, Chunk};
use cognito_core::Error;

fn article(content: &str) -> Article {
    Article::new("kb-42", "Firecraft", content)
}

fn long_article_text() -> String {
    let mut text = String::new();
    for p in 0..12 {
        for s in 0..15 {
            text.push_str(&format!("Fire {p}.{s} needs dry tinder and patience. "));
        }
        text.push_str("\n\n");
    }
    text
}

#[test]
fn default_chunker_keeps_small_articles_whole() {
    let chunker = Chunker::default();
    let a = article("Cats are small mammals.");
    let chunks = chunker.split_article(&a);
    assert_eq!(chunks.len(), 1, "content shorter than chunk_size becomes one chunk");
    assert_eq!(chunks[0].text, a.content);
    assert_eq!(chunks[0].metadata.get("article_id").map(String::as_str), Some("kb-42"));
    assert_eq!(chunks[0].metadata.get("title").map(String::as_str), Some("Firecraft"));
    assert_eq!(chunks[0].metadata.get("source").map(String::as_str), Some("api_ingestion"));
}

#[test]
fn content_exactly_chunk_size_is_not_split() {
    let chunker = Chunker::new(ChunkingConfig { chunk_size: 64, chunk_overlap: 16 }).expect("chunker");
    let text = "y".repeat(64);
    let chunks = chunker.split_article(&article(&text));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
}

#[test]
fn long_articles_respect_size_overlap_and_order() {
    let config = ChunkingConfig { chunk_size: 300, chunk_overlap: 60 };
    let chunker = Chunker::new(config).expect("chunker");
    let text = long_article_text();
    let chunks = chunker.split_article(&article(&text));

    assert!(chunks.len() > 5, "expected many chunks, got {}", chunks.len());
    for (i, ch) in chunks.iter().enumerate() {
        assert_eq!(ch.index, i);
        assert!(ch.text.chars().count() <= config.chunk_size, "chunk {i} too long");
        assert!(ch.text[..ch.overlap].chars().count() <= config.chunk_overlap, "chunk {i} overlap too long");
        assert_eq!(&text[ch.start..ch.start + ch.text.len()], ch.text);
        assert_eq!(ch.metadata.get("chunk_index"), Some(&i.to_string()));
        assert_eq!(ch.metadata.get("article_id").map(String::as_str), Some("kb-42"));
    }
    assert_eq!(chunks[0].overlap, 0);
    assert!(chunks.iter().skip(1).any(|c| c.overlap > 0), "sentence pieces should carry overlap");

    let rebuilt: String = chunks.iter().map(Chunk::fresh_text).collect();
    assert_eq!(rebuilt, text, "dropping the declared overlap reconstructs the content");
}

#[test]
fn chunking_is_deterministic() {
    let chunker = Chunker::new(ChunkingConfig { chunk_size: 200, chunk_overlap: 40 }).expect("chunker");
    let text = long_article_text();
    assert_eq!(chunker.split_article(&article(&text)), chunker.split_article(&article(&text)));
}

#[test]
fn settings_defaults_match_documented_values() {
    figment::Jail::expect_with(|_jail| {
        let settings = Settings::load_for_env("test").map_err(|e| e.to_string())?;
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.embedding.dimension, 1536);
        assert_eq!(settings.search.default_k, 3);
        assert_eq!(settings.storage.collection, "cognito_desk_knowledge");
        assert_eq!(settings.storage.metric, Metric::L2);
        Ok(())
    });
}

#[test]
fn settings_layer_files_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
                [storage]
                path = "/var/lib/kb"
                metric = "cosine"

                [chunking]
                chunk_size = 500
            "#,
        )?;
        jail.create_file("config.test.toml", "[chunking]\nchunk_overlap = 50\n")?;
        jail.set_env("APP_STORAGE__COLLECTION", "support_articles");
        jail.set_env("APP_SEARCH__DEFAULT_K", "7");

        let settings = Settings::load_for_env("test").map_err(|e| e.to_string())?;
        assert_eq!(settings.storage.path, "/var/lib/kb");
        assert_eq!(settings.storage.metric, Metric::Cosine);
        assert_eq!(settings.storage.collection, "support_articles");
        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.chunk_overlap, 50);
        assert_eq!(settings.search.default_k, 7);
        Ok(())
    });
}

#[test]
fn settings_reject_overlap_not_smaller_than_size() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")?;
        let err = Settings::load_for_env("test").expect_err("overlap == size is invalid");
        assert!(matches!(err, Error::InvalidConfig(_)), "got {err:?}");
        Ok(())
    });
}

#[test]
fn settings_reject_bad_collection_names() {
    let mut settings = Settings::default();
    settings.storage.collection = "../escape".to_string();
    assert!(settings.validate().is_err());
    settings.storage.collection = String::new();
    assert!(settings.validate().is_err());
    settings.storage.collection = "kb.v2-articles_1".to_string();
    assert!(settings.validate().is_ok());
}

#[test]
fn storage_path_expands_env_vars() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("KB_HOME", "/srv/kb");
        let mut settings = Settings::default();
        settings.storage.path = "${KB_HOME}/lance".to_string();
        assert_eq!(settings.storage.resolved_path(), std::path::PathBuf::from("/srv/kb/lance"));
        Ok(())
    });
}

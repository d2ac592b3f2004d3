//! Recursive, separator-aware splitting of article content into overlapping
//! chunks.
//!
//! Text is first cut into pieces at the highest-priority separator present
//! (paragraph, line, sentence end, whitespace, then any character boundary).
//! Separators stay attached to the piece they terminate, so the pieces tile the
//! content exactly. Pieces longer than `chunk_size` are cut again with the
//! lower-priority separators. The pieces are then merged greedily into chunks
//! of at most `chunk_size` characters, each new chunk starting with the tail of
//! the previous one (at most `chunk_overlap` characters).

use std::collections::VecDeque;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Article, Chunk, Meta};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Tried in order. The empty separator splits at every character boundary.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " ", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split an article's content, tagging every chunk with the article metadata.
    pub fn split_article(&self, article: &Article) -> Vec<Chunk> {
        self.split(&article.content, &article.metadata())
    }

    /// Split `content` into ordered chunks. Total: empty content yields no chunks.
    pub fn split(&self, content: &str, metadata: &Meta) -> Vec<Chunk> {
        self.spans(content)
            .into_iter()
            .enumerate()
            .map(|(index, (range, overlap))| {
                let mut meta = metadata.clone();
                meta.insert("chunk_index".to_string(), index.to_string());
                Chunk { text: content[range.clone()].to_string(), index, start: range.start, overlap, metadata: meta }
            })
            .collect()
    }

    /// Byte range of every chunk, paired with the number of leading bytes it
    /// shares with the previous chunk.
    fn spans(&self, content: &str) -> Vec<(Range<usize>, usize)> {
        if content.is_empty() {
            return Vec::new();
        }
        if char_len(content) <= self.config.chunk_size {
            return vec![(0..content.len(), 0)];
        }
        let mut pieces = Vec::new();
        self.collect_pieces(content, 0, SEPARATORS, &mut pieces);
        self.merge(&pieces)
    }

    fn collect_pieces(&self, text: &str, offset: usize, separators: &[&str], out: &mut Vec<Piece>) {
        let (separator, rest) = match separators.iter().position(|s| s.is_empty() || text.contains(s)) {
            Some(i) => (separators[i], &separators[i + 1..]),
            None => ("", &[][..]),
        };
        for (rel, part) in split_keeping_separator(text, separator) {
            let chars = char_len(part);
            if chars <= self.config.chunk_size || separator.is_empty() {
                out.push(Piece { start: offset + rel, end: offset + rel + part.len(), chars });
            } else {
                self.collect_pieces(part, offset + rel, rest, out);
            }
        }
    }

    fn merge(&self, pieces: &[Piece]) -> Vec<(Range<usize>, usize)> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let mut spans = Vec::new();
        let mut window: VecDeque<Piece> = VecDeque::new();
        let mut total = 0usize;
        let mut carried = 0usize;

        for piece in pieces {
            if total + piece.chars > size && !window.is_empty() {
                spans.push((window_range(&window), carried));
                // Keep the longest tail that fits the overlap budget and leaves room for `piece`.
                while total > overlap || (total > 0 && total + piece.chars > size) {
                    let Some(first) = window.pop_front() else { break };
                    total -= first.chars;
                }
                carried = if window.is_empty() { 0 } else { window_range(&window).len() };
            }
            window.push_back(*piece);
            total += piece.chars;
        }
        if !window.is_empty() {
            spans.push((window_range(&window), carried));
        }
        spans
    }
}

fn window_range(window: &VecDeque<Piece>) -> Range<usize> {
    match (window.front(), window.back()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => 0..0,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split after every occurrence of `separator`; the empty separator yields
/// one part per character. Parts are returned with their byte offset.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<(usize, &'a str)> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| (i, &text[i..i + c.len_utf8()])).collect();
    }
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, sep) in text.match_indices(separator) {
        let end = i + sep.len();
        parts.push((start, &text[start..end]));
        start = end;
    }
    if start < text.len() {
        parts.push((start, &text[start..]));
    }
    parts
}

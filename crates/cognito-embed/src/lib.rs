//! Embedding providers for the knowledge base.
//!
//! The shipped provider is `FakeEmbedder`: a deterministic feature-hashing
//! embedder that needs no model files. Lower-cased word tokens are hashed with
//! xxHash64 into `dim` signed buckets and the result is L2-normalized, so texts
//! sharing words land close together and identical texts embed identically.

use std::hash::Hasher;

use cognito_core::config::EmbeddingSettings;
use cognito_core::error::{Error, Result};
use cognito_core::traits::Embedder;
use twox_hash::XxHash64;

const HASH_SEED: u64 = 0x636f_676e_6974_6f00;

#[derive(Debug, Clone)]
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("embedding dimension must be greater than 0".to_string()));
        }
        Ok(Self { dim })
    }

    fn accumulate(&self, v: &mut [f32], feature: &str) {
        let mut hasher = XxHash64::with_seed(HASH_SEED);
        hasher.write(feature.as_bytes());
        let h = hasher.finish();
        let idx = (h % self.dim as u64) as usize;
        let magnitude = 0.5 + 0.5 * (((h >> 32) as u32) as f32 / u32::MAX as f32);
        let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
        v[idx] += sign * magnitude;
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            // Punctuation-only or blank text: hash the raw characters so the vector is never zero.
            self.accumulate(&mut v, text);
        }
        for token in &tokens {
            self.accumulate(&mut v, token);
        }
        let mut norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm <= f32::EPSILON {
            // Every feature cancelled out; fall back to the raw text in bucket space.
            self.accumulate(&mut v, text);
            norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        }
        if !norm.is_finite() || norm <= f32::EPSILON {
            return Err(Error::Embedding(format!("could not embed text of {} bytes", text.len())));
        }
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Build the embedder named by `settings.provider`.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    match settings.provider.as_str() {
        "fake" | "hash" => {
            tracing::info!(dim = settings.dimension, "using FakeEmbedder");
            Ok(Box::new(FakeEmbedder::new(settings.dimension)?))
        }
        other => Err(Error::InvalidConfig(format!("unknown embedding provider '{other}'"))),
    }
}

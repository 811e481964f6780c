//! Deterministic mock embedding provider.

use crate::embeddings::provider::EmbeddingProvider;
use skydoc_core::AppResult;

/// Mock provider for tests and offline development.
///
/// Hashes word and word-pair features into a fixed number of dimensions and
/// normalizes the result. Not semantically meaningful like a real embedding
/// model, but deterministic and content-dependent: texts sharing vocabulary
/// score higher under cosine similarity than unrelated texts.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a new mock provider with the given dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 2)
            .collect();

        for token in &tokens {
            let dim = (fnv1a(token.as_bytes()) as usize) % self.dimensions;
            embedding[dim] += 1.0;
        }

        // Word pairs add a little phrase sensitivity
        for pair in tokens.windows(2) {
            let key = format!("{} {}", pair[0], pair[1]);
            let dim = (fnv1a(key.as_bytes()) as usize) % self.dimensions;
            embedding[dim] += 0.5;
        }

        normalize(&mut embedding);
        embedding
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "hashed-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

//! Offline bag-of-words embedding provider.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// A deterministic [`EmbeddingProvider`] that needs no network access.
///
/// Each token is lowercased, stripped of surrounding punctuation and hashed
/// with SHA-256; the digest picks a bucket and a sign. Texts that share words
/// therefore point in similar directions. Vectors are L2-normalised, and a
/// text without tokens maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Default vector size.
    pub const DEFAULT_DIMENSIONS: usize = 256;

    /// Create a provider producing vectors of `dimensions` entries.
    ///
    /// A dimension of zero is bumped to one.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let slot = (u64::from_le_bytes(bucket) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reranker::cosine_similarity;

    #[tokio::test]
    async fn same_words_same_vector() {
        let provider = HashEmbeddingProvider::new(64);
        let a = provider.embed("The Cat sat.").await.unwrap();
        let b = provider.embed("the cat SAT").await.unwrap();
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn vectors_are_unit_length() {
        let provider = HashEmbeddingProvider::default();
        let v = provider.embed("retrieval augmented generation over one document").await.unwrap();
        assert_eq!(v.len(), HashEmbeddingProvider::DEFAULT_DIMENSIONS);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn punctuation_only_text_is_zero_vector() {
        let provider = HashEmbeddingProvider::new(16);
        let v = provider.embed(" ... !! ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let provider = HashEmbeddingProvider::new(32);
        let batch = provider.embed_batch(&["alpha", "beta", "alpha"]).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], batch[2]);
        assert_eq!(batch[1], provider.embed("beta").await.unwrap());
    }

    #[test]
    fn zero_dimensions_bumped_to_one() {
        assert_eq!(HashEmbeddingProvider::new(0).dimensions(), 1);
    }
}

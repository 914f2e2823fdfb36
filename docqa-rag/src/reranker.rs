//! Similarity-based reranking of nearest-neighbour candidates.

use crate::error::{RagError, Result};
use crate::index::ensure_finite;

/// A nearest-neighbour hit prepared for reranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Position of the chunk in the chunk list.
    pub index: usize,
    /// Squared L2 distance reported by the index.
    pub distance: f32,
    /// Embedding of the candidate chunk.
    pub embedding: Vec<f32>,
    /// Relevance score assigned by the reranker (higher is more relevant).
    pub score: f32,
}

/// A reranker that re-scores and reorders nearest-neighbour candidates.
///
/// Candidates arrive in nearest-neighbour order; implementations must keep
/// that order among candidates they score equally.
pub trait Reranker: Send + Sync {
    /// Rerank candidates against the query embedding.
    fn rerank(&self, query_embedding: &[f32], candidates: Vec<Candidate>)
    -> Result<Vec<Candidate>>;
}

/// Reorders candidates by descending cosine similarity to the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineReranker;

impl Reranker for CosineReranker {
    fn rerank(
        &self,
        query_embedding: &[f32],
        mut candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        ensure_finite(query_embedding, || "query".to_string())?;
        for candidate in &mut candidates {
            if candidate.embedding.len() != query_embedding.len() {
                return Err(RagError::DimensionMismatch {
                    expected: query_embedding.len(),
                    actual: candidate.embedding.len(),
                });
            }
            ensure_finite(&candidate.embedding, || format!("candidate {}", candidate.index))?;
            candidate.score = cosine_similarity(query_embedding, &candidate.embedding);
        }

        // sort_by is stable, so equal scores keep nearest-neighbour order
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(candidates)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude. Sums are taken in `f64`,
/// so any finite `f32` input yields a finite result in `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}

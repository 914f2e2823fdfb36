//! Exact nearest-neighbour vector index.
//!
//! [`FlatL2Index`] stores every embedding in one contiguous buffer and
//! answers queries by scanning all of them with squared Euclidean distance.
//! For a single document this is fast enough and gives reproducible results:
//! equal distances are ordered by insertion index.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RagError, Result};

/// A search hit: the insertion index of a stored vector and its distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Position of the vector in build/insertion order.
    pub index: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// A structure supporting nearest-neighbour search over a fixed set of embeddings.
pub trait VectorIndex: Send + Sync {
    /// Replace the index contents with `embeddings`.
    fn build(&mut self, embeddings: Vec<Vec<f32>>) -> Result<()>;

    /// Return up to `k` nearest stored vectors, nearest first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// The stored vector at `index`, if any.
    fn vector(&self, index: usize) -> Option<&[f32]>;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether no vectors are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The vector dimension, once established.
    fn dimension(&self) -> Option<usize>;
}

/// Brute-force index over squared L2 distance.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{FlatL2Index, VectorIndex};
///
/// let mut index = FlatL2Index::new();
/// index.build(embeddings)?;
/// let hits = index.search(&query, 3)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlatL2Index {
    dimension: Option<usize>,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty, unbuilt index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index and build it from `embeddings`.
    pub fn from_embeddings(embeddings: Vec<Vec<f32>>) -> Result<Self> {
        let mut index = Self::new();
        index.build(embeddings)?;
        Ok(index)
    }

    /// Append a single embedding.
    ///
    /// The first embedding added to an empty index establishes its dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyInput`] for a zero-length first embedding,
    /// [`RagError::DimensionMismatch`] when the size differs from the index and
    /// [`RagError::NonFiniteEmbedding`] for NaN or infinite components.
    pub fn add(&mut self, embedding: &[f32]) -> Result<()> {
        ensure_finite(embedding, || format!("embedding {}", self.len()))?;
        match self.dimension {
            None if embedding.is_empty() => {
                return Err(RagError::EmptyInput("embedding has zero dimensions".to_string()));
            }
            None => self.dimension = Some(embedding.len()),
            Some(expected) if expected != embedding.len() => {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
            Some(_) => {}
        }
        self.data.extend_from_slice(embedding);
        Ok(())
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        let dimension = self.dimension.unwrap_or(1);
        self.data.chunks_exact(dimension)
    }
}

/// Fail with [`RagError::NonFiniteEmbedding`] if any component is NaN or infinite.
pub(crate) fn ensure_finite(vector: &[f32], what: impl FnOnce() -> String) -> Result<()> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(component) => {
            Err(RagError::NonFiniteEmbedding(format!("{} at component {component}", what())))
        }
        None => Ok(()),
    }
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for FlatL2Index {
    fn build(&mut self, embeddings: Vec<Vec<f32>>) -> Result<()> {
        let Some(first) = embeddings.first() else {
            return Err(RagError::EmptyInput("cannot build an index from zero embeddings".into()));
        };
        if first.is_empty() {
            return Err(RagError::EmptyInput("embedding has zero dimensions".to_string()));
        }

        let dimension = first.len();
        let mut data = Vec::with_capacity(dimension * embeddings.len());
        for (row, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            ensure_finite(embedding, || format!("embedding {row}"))?;
            data.extend_from_slice(embedding);
        }

        self.dimension = Some(dimension);
        self.data = data;
        info!(vectors = embeddings.len(), dimension, "vector index built");
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let dimension = match self.dimension {
            Some(dimension) if !self.data.is_empty() => dimension,
            _ => return Err(RagError::IndexNotBuilt),
        };
        if query.len() != dimension {
            return Err(RagError::DimensionMismatch { expected: dimension, actual: query.len() });
        }
        ensure_finite(query, || "query".to_string())?;

        let mut hits: Vec<Neighbor> = self
            .rows()
            .enumerate()
            .map(|(index, row)| Neighbor { index, distance: squared_l2(row, query) })
            .collect();

        // distances may overflow to +inf but are never NaN
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.index.cmp(&b.index)));
        hits.truncate(k);

        debug!(k, result_count = hits.len(), "vector index search completed");
        Ok(hits)
    }

    fn vector(&self, index: usize) -> Option<&[f32]> {
        self.rows().nth(index)
    }

    fn len(&self) -> usize {
        match self.dimension {
            Some(dimension) => self.data.len() / dimension,
            None => 0,
        }
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_before_build_fails() {
        let index = FlatL2Index::new();
        assert!(matches!(index.search(&[0.0, 1.0], 3), Err(RagError::IndexNotBuilt)));
    }

    #[test]
    fn build_rejects_empty_input() {
        let mut index = FlatL2Index::new();
        assert!(matches!(index.build(Vec::new()), Err(RagError::EmptyInput(_))));
        assert!(matches!(index.build(vec![Vec::new()]), Err(RagError::EmptyInput(_))));
    }

    #[test]
    fn build_rejects_ragged_embeddings() {
        let mut index = FlatL2Index::new();
        let err = index.build(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1 }));
        assert!(index.is_empty());
    }

    #[test]
    fn search_orders_by_distance() {
        let index = FlatL2Index::from_embeddings(vec![
            vec![10.0, 0.0],
            vec![1.0, 0.0],
            vec![3.0, 0.0],
        ])
        .unwrap();
        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits, vec![
            Neighbor { index: 1, distance: 1.0 },
            Neighbor { index: 2, distance: 9.0 },
        ]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = FlatL2Index::from_embeddings(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, -1.0],
        ])
        .unwrap();
        let order: Vec<usize> =
            index.search(&[0.0, 0.0], 3).unwrap().iter().map(|n| n.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn k_beyond_size_returns_everything() {
        let index = FlatL2Index::from_embeddings(vec![vec![0.5], vec![0.25]]).unwrap();
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 2);
        assert!(index.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn query_dimension_must_match() {
        let index = FlatL2Index::from_embeddings(vec![vec![0.0, 0.0, 0.0]]).unwrap();
        let err = index.search(&[0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut index = FlatL2Index::from_embeddings(vec![vec![1.0, 1.0]; 4]).unwrap();
        index.build(vec![vec![2.0, 2.0, 2.0]]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.dimension(), Some(3));
        assert_eq!(index.vector(0), Some(&[2.0, 2.0, 2.0][..]));
        assert_eq!(index.vector(1), None);
    }

    #[test]
    fn incremental_add_checks_dimension() {
        let mut index = FlatL2Index::new();
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0]).unwrap();
        assert!(matches!(index.add(&[1.0]), Err(RagError::DimensionMismatch { .. })));
        assert_eq!(index.len(), 2);
        assert_eq!(index.search(&[0.0, 1.0], 1).unwrap()[0].index, 1);
    }

    #[test]
    fn non_finite_rows_are_rejected_at_build() {
        let rows: Vec<Vec<f32>> = (0..64)
            .map(|i| if i % 3 == 0 { vec![f32::NAN, 0.0] } else { vec![i as f32, 1.0] })
            .collect();
        let mut index = FlatL2Index::new();
        let err = index.build(rows).unwrap_err();
        assert!(matches!(err, RagError::NonFiniteEmbedding(ref m) if m.contains("embedding 0")));
        assert!(index.is_empty());

        let err = index.build(vec![vec![1.0, 2.0], vec![f32::INFINITY, 0.0]]).unwrap_err();
        assert!(matches!(err, RagError::NonFiniteEmbedding(_)));
    }

    #[test]
    fn non_finite_add_and_query_are_rejected() {
        let mut index = FlatL2Index::new();
        index.add(&[1.0, 0.0]).unwrap();
        assert!(matches!(index.add(&[f32::NAN, 0.0]), Err(RagError::NonFiniteEmbedding(_))));
        assert_eq!(index.len(), 1);

        let err = index.search(&[f32::NEG_INFINITY, 0.0], 1).unwrap_err();
        assert!(matches!(err, RagError::NonFiniteEmbedding(ref m) if m.starts_with("query")));
    }

    #[test]
    fn overflowing_distances_still_sort() {
        let rows: Vec<Vec<f32>> = (0..40)
            .map(|i| if i % 2 == 0 { vec![3e38, -3e38] } else { vec![i as f32, 0.0] })
            .collect();
        let index = FlatL2Index::from_embeddings(rows).unwrap();
        let hits = index.search(&[0.0, 0.0], 40).unwrap();

        assert_eq!(hits.len(), 40);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(hits[..20].iter().all(|h| h.index % 2 == 1));
        assert!(hits[20..].iter().all(|h| h.distance == f32::INFINITY));
    }
}

//! Configuration for document sessions.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Where the retriever gets candidate embeddings for reranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidateEmbeddings {
    /// Ask the embedding provider again for each candidate chunk.
    #[default]
    Reembed,
    /// Reuse the vectors stored in the index at build time.
    Indexed,
}

/// Configuration parameters for a [`DocumentSession`](crate::DocumentSession).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in words.
    pub chunk_size: usize,
    /// Number of words shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks to retrieve per question.
    pub top_k: usize,
    /// Source of candidate embeddings during reranking.
    #[serde(default)]
    pub candidate_embeddings: CandidateEmbeddings,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            candidate_embeddings: CandidateEmbeddings::Reembed,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::InvalidConfiguration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in words.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in words.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks to retrieve per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set where candidate embeddings come from during reranking.
    pub fn candidate_embeddings(mut self, source: CandidateEmbeddings) -> Self {
        self.config.candidate_embeddings = source;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_document_qa_settings() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.candidate_embeddings, CandidateEmbeddings::Reembed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_overlap_not_below_chunk_size() {
        let err = RagConfig::builder().chunk_size(10).chunk_overlap(10).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn missing_candidate_source_deserializes_to_reembed() {
        let config: RagConfig =
            serde_json::from_str(r#"{"chunk_size":5,"chunk_overlap":1,"top_k":2}"#).unwrap();
        assert_eq!(config.candidate_embeddings, CandidateEmbeddings::Reembed);
    }
}

//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Chunking or pipeline parameters are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An operation that needs data was given none.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The vector index was searched before it was built.
    #[error("Vector index has not been built")]
    IndexNotBuilt,

    /// A vector does not have the dimension the index or query expects.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension established by the index or query.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// A vector holds NaN or an infinite component.
    #[error("Non-finite embedding: {0}")]
    NonFiniteEmbedding(String),

    /// A chunk position does not exist in the chunk list or index.
    #[error("Chunk {index} is out of range for {chunk_count} chunks")]
    ChunkOutOfRange {
        /// The requested chunk position.
        index: usize,
        /// Number of chunks available.
        chunk_count: usize,
    },

    /// The upstream embedding call failed.
    #[error("Embedding provider error ({provider}): {message}")]
    EmbeddingProvider {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Retrieval failed at the named stage.
    #[error("Retrieval failed during {stage}: {source}")]
    RetrievalFailed {
        /// The retrieval stage that failed.
        stage: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<RagError>,
    },

    /// The answer generator failed.
    #[error("Answer generation error ({generator}): {message}")]
    AnswerGeneration {
        /// The generator that produced the error.
        generator: String,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    /// Wrap this error as a [`RagError::RetrievalFailed`] for the given stage.
    pub fn during(self, stage: &'static str) -> Self {
        RagError::RetrievalFailed { stage, source: Box::new(self) }
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;

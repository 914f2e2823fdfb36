//! Question-time retrieval: embed → search → re-embed candidates → rerank.
//!
//! [`Retriever::retrieve`] never fails: any error below it is logged and
//! turned into an empty result, which callers read as "no relevant content".
//! [`Retriever::try_retrieve`] runs the same steps but returns the failure as
//! [`RagError::RetrievalFailed`], naming the stage that broke.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::CandidateEmbeddings;
use crate::document::RetrievedChunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{Neighbor, VectorIndex};
use crate::reranker::{Candidate, CosineReranker, Reranker};

/// Retrieves the chunks most relevant to a question.
///
/// Owns the vector index built for one document. Construct one with
/// [`Retriever::new`] and adjust it with the `with_*` methods.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{FlatL2Index, Retriever};
///
/// let index = FlatL2Index::from_embeddings(embeddings)?;
/// let retriever = Retriever::new(provider.clone(), Box::new(index));
/// let context = retriever.retrieve("Where did the cat sit?", &chunks, 3).await;
/// ```
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Box<dyn VectorIndex>,
    reranker: Arc<dyn Reranker>,
    candidate_embeddings: CandidateEmbeddings,
}

impl Retriever {
    /// Create a retriever over `index` that reranks by cosine similarity and
    /// re-embeds candidates through `embedding_provider`.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        index: Box<dyn VectorIndex>,
    ) -> Self {
        Self {
            embedding_provider,
            index,
            reranker: Arc::new(CosineReranker),
            candidate_embeddings: CandidateEmbeddings::default(),
        }
    }

    /// Replace the reranker.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = reranker;
        self
    }

    /// Choose where candidate embeddings come from.
    pub fn with_candidate_embeddings(mut self, source: CandidateEmbeddings) -> Self {
        self.candidate_embeddings = source;
        self
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Retrieve up to `top_k` chunk texts, most relevant first.
    ///
    /// Any failure yields an empty `Vec`; the error is logged.
    pub async fn retrieve(&self, query: &str, chunks: &[String], top_k: usize) -> Vec<String> {
        match self.try_retrieve(query, chunks, top_k).await {
            Ok(results) => results.into_iter().map(|r| r.text).collect(),
            Err(e) => {
                error!(error = %e, "error during retrieval");
                Vec::new()
            }
        }
    }

    /// Retrieve up to `top_k` chunks with their similarity scores.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalFailed`] wrapping the failure of the
    /// query embedding, index search, candidate lookup, candidate embedding or
    /// reranking stage.
    pub async fn try_retrieve(
        &self,
        query: &str,
        chunks: &[String],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        // 1. Embed the query
        let query_embedding = self
            .embedding_provider
            .embed(query)
            .await
            .map_err(|e| e.during("query embedding"))?;

        // 2. Nearest-neighbour search
        let neighbors =
            self.index.search(&query_embedding, top_k).map_err(|e| e.during("index search"))?;
        debug!(candidate_count = neighbors.len(), "nearest-neighbour candidates found");

        for neighbor in &neighbors {
            if neighbor.index >= chunks.len() {
                return Err(RagError::ChunkOutOfRange {
                    index: neighbor.index,
                    chunk_count: chunks.len(),
                }
                .during("candidate lookup"));
            }
        }

        // 3. Embeddings for exactly the candidate chunks
        let embeddings = self
            .candidate_embeddings(&neighbors, chunks)
            .await
            .map_err(|e| e.during("candidate embedding"))?;

        let candidates = neighbors
            .iter()
            .zip(embeddings)
            .map(|(neighbor, embedding)| Candidate {
                index: neighbor.index,
                distance: neighbor.distance,
                embedding,
                score: 0.0,
            })
            .collect();

        // 4-5. Score and reorder
        let ranked = self
            .reranker
            .rerank(&query_embedding, candidates)
            .map_err(|e| e.during("reranking"))?;

        let results = ranked
            .into_iter()
            .map(|c| {
                let text = chunks.get(c.index).cloned().ok_or(RagError::ChunkOutOfRange {
                    index: c.index,
                    chunk_count: chunks.len(),
                })?;
                Ok(RetrievedChunk { index: c.index, text, score: c.score })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.during("reranking"))?;

        info!(result_count = results.len(), "retrieved relevant chunks");
        Ok(results)
    }

    async fn candidate_embeddings(
        &self,
        neighbors: &[Neighbor],
        chunks: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        match self.candidate_embeddings {
            CandidateEmbeddings::Reembed => {
                let texts: Vec<&str> = neighbors.iter().map(|n| chunks[n.index].as_str()).collect();
                let embeddings = self.embedding_provider.embed_batch(&texts).await?;
                if embeddings.len() != texts.len() {
                    return Err(RagError::EmbeddingProvider {
                        provider: "embed_batch".into(),
                        message: format!(
                            "requested {} embeddings, received {}",
                            texts.len(),
                            embeddings.len()
                        ),
                    });
                }
                Ok(embeddings)
            }
            CandidateEmbeddings::Indexed => neighbors
                .iter()
                .map(|n| {
                    self.index.vector(n.index).map(<[f32]>::to_vec).ok_or(
                        RagError::ChunkOutOfRange { index: n.index, chunk_count: self.index.len() },
                    )
                })
                .collect(),
        }
    }
}

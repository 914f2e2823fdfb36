//! Per-document session orchestrator.
//!
//! A [`DocumentSession`] owns everything built from one document: the chunk
//! list, the vector index and the retriever. Sessions share nothing mutable,
//! so a server can hold one per user.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{DocumentSession, HashEmbeddingProvider, RagConfig};
//!
//! let mut session = DocumentSession::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashEmbeddingProvider::default()))
//!     .build()?;
//!
//! session.ingest(&raw_text).await?;
//! let answer = session.ask("What is the key insight?", generator).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::answer::{AnswerGenerator, GroundedAnswerer, join_context};
use crate::chunking::{Chunker, WordWindowChunker};
use crate::config::RagConfig;
use crate::document::{RetrievedChunk, normalize_text};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{FlatL2Index, VectorIndex};
use crate::retriever::Retriever;

/// The retrieval state for a single document.
///
/// Coordinates ingestion (normalize → chunk → embed → build index) and
/// question answering (retrieve → join context → answer). Construct one via
/// [`DocumentSession::builder()`].
pub struct DocumentSession {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    chunks: Vec<String>,
    retriever: Option<Retriever>,
}

impl DocumentSession {
    /// Create a new [`DocumentSessionBuilder`].
    pub fn builder() -> DocumentSessionBuilder {
        DocumentSessionBuilder::default()
    }

    /// Return a reference to the session configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The chunks of the current document, in document order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Whether a document has been ingested.
    pub fn is_ready(&self) -> bool {
        self.retriever.is_some()
    }

    /// Ingest a document, replacing any previous one.
    ///
    /// Returns the number of chunks indexed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyInput`] when the text yields no chunks, and
    /// propagates embedding and index build failures. On error the previous
    /// document is discarded.
    pub async fn ingest(&mut self, raw_text: &str) -> Result<usize> {
        self.chunks.clear();
        self.retriever = None;

        // 1. Normalize and chunk
        let text = normalize_text(raw_text);
        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            error!("no text chunks generated");
            return Err(RagError::EmptyInput("document produced no chunks".to_string()));
        }

        // 2. Embed every chunk in one batch
        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = self
            .embedding_provider
            .embed_batch(&texts)
            .await
            .inspect_err(|e| error!(error = %e, "embedding failed during ingestion"))?;
        if embeddings.len() != chunks.len() {
            error!(
                requested = chunks.len(),
                received = embeddings.len(),
                "embedding count mismatch during ingestion"
            );
            return Err(RagError::EmbeddingProvider {
                provider: "embed_batch".into(),
                message: format!(
                    "requested {} embeddings, received {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        // 3. Build a fresh index
        let mut index = FlatL2Index::new();
        index
            .build(embeddings)
            .inspect_err(|e| error!(error = %e, "index build failed during ingestion"))?;

        let retriever = Retriever::new(self.embedding_provider.clone(), Box::new(index))
            .with_candidate_embeddings(self.config.candidate_embeddings);

        let chunk_count = chunks.len();
        self.chunks = chunks;
        self.retriever = Some(retriever);
        info!(chunk_count, "ingested document");

        Ok(chunk_count)
    }

    /// Retrieve the configured `top_k` most relevant chunk texts.
    ///
    /// Returns an empty `Vec` when nothing is ingested or retrieval fails.
    pub async fn retrieve(&self, question: &str) -> Vec<String> {
        match &self.retriever {
            Some(retriever) => retriever.retrieve(question, &self.chunks, self.config.top_k).await,
            None => {
                warn!("retrieval requested before any document was ingested");
                Vec::new()
            }
        }
    }

    /// Retrieve the most relevant chunks with scores.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalFailed`] on any failure, including a
    /// search before ingestion ([`RagError::IndexNotBuilt`]).
    pub async fn try_retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>> {
        let retriever = self
            .retriever
            .as_ref()
            .ok_or_else(|| RagError::IndexNotBuilt.during("index search"))?;
        retriever.try_retrieve(question, &self.chunks, self.config.top_k).await
    }

    /// Retrieved chunks for `question` joined into one context string.
    pub async fn context(&self, question: &str) -> String {
        join_context(&self.retrieve(question).await)
    }

    /// Answer `question` from the retrieved context.
    ///
    /// Empty context yields [`INFORMATION_NOT_FOUND`](crate::INFORMATION_NOT_FOUND)
    /// without calling `generator`.
    pub async fn ask(&self, question: &str, generator: Arc<dyn AnswerGenerator>) -> Result<String> {
        let context = self.context(question).await;
        GroundedAnswerer::new(generator).answer(&context, question).await
    }
}

/// Builder for constructing a [`DocumentSession`].
///
/// The embedding provider is required. The config defaults to
/// [`RagConfig::default()`] and the chunker to a [`WordWindowChunker`]
/// built from the config.
#[derive(Default)]
pub struct DocumentSessionBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl DocumentSessionBuilder {
    /// Set the session configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Override the chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`DocumentSession`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if the embedding provider is
    /// missing or the config is inconsistent.
    pub fn build(self) -> Result<DocumentSession> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(WordWindowChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(DocumentSession {
            config,
            embedding_provider,
            chunker,
            chunks: Vec::new(),
            retriever: None,
        })
    }
}

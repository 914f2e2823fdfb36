//! # docqa-rag
//!
//! Retrieval core for answering questions about a single document.
//!
//! The crate covers the path from raw text to ranked context:
//!
//! - [`normalize_text`] and [`extract_text`] turn raw (optionally paged) text
//!   into a single normalized string
//! - [`WordWindowChunker`] splits it into overlapping word windows
//! - an [`EmbeddingProvider`] maps text to vectors
//! - [`FlatL2Index`] answers exact nearest-neighbour queries
//! - [`Retriever`] embeds a question, searches the index and reranks the
//!   candidates by cosine similarity
//! - [`DocumentSession`] ties all of it together for one document
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{DocumentSession, HashEmbeddingProvider, RagConfig};
//!
//! let mut session = DocumentSession::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashEmbeddingProvider::new(256)))
//!     .build()?;
//!
//! session.ingest(&raw_text).await?;
//! let chunks = session.retrieve("What is the key insight?").await;
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod index;
pub mod reranker;
pub mod retriever;
pub mod session;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use answer::{AnswerGenerator, GroundedAnswerer, INFORMATION_NOT_FOUND, join_context};
pub use chunking::{Chunker, WordWindowChunker, chunk_text};
pub use config::{CandidateEmbeddings, RagConfig, RagConfigBuilder};
pub use document::{PageRange, RetrievedChunk, extract_text, normalize_text, split_pages};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use hashing::HashEmbeddingProvider;
pub use index::{FlatL2Index, Neighbor, VectorIndex};
pub use reranker::{Candidate, CosineReranker, Reranker, cosine_similarity};
pub use retriever::Retriever;
pub use session::{DocumentSession, DocumentSessionBuilder};

#[cfg(feature = "gemini")]
pub use gemini::GeminiEmbeddingProvider;

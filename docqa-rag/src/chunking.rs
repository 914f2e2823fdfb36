//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`WordWindowChunker`], which
//! splits text into fixed-size windows of words with a configurable overlap.

use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// A strategy for splitting document text into chunks.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` if the text contains no words.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into overlapping windows of whitespace-delimited words.
///
/// Each window holds `chunk_size` words joined by single spaces, and the
/// window start advances by `chunk_size - overlap` words. The final window
/// may be shorter.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{Chunker, WordWindowChunker};
///
/// let chunker = WordWindowChunker::new(500, 50)?;
/// let chunks = chunker.chunk(&text);
/// ```
#[derive(Debug, Clone)]
pub struct WordWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of words per chunk
    /// * `overlap`: number of words shared by consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] unless `chunk_size > overlap`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size <= overlap {
            return Err(RagError::InvalidConfiguration(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Maximum number of words per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of words shared by consecutive chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            warn!("no text found to chunk");
            return Vec::new();
        }

        let chunks: Vec<String> = (0..words.len())
            .step_by(self.stride())
            .map(|start| {
                let end = (start + self.chunk_size).min(words.len());
                words[start..end].join(" ")
            })
            .collect();

        debug!(
            word_count = words.len(),
            chunk_count = chunks.len(),
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            "text chunked"
        );
        chunks
    }
}

/// Chunk `text` with a one-off [`WordWindowChunker`].
///
/// # Errors
///
/// Returns [`RagError::InvalidConfiguration`] unless `chunk_size > overlap`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(WordWindowChunker::new(chunk_size, overlap)?.chunk(text))
}

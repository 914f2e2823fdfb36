//! Answer generator seam.
//!
//! The language model that turns retrieved context into an answer lives
//! outside this crate. [`GroundedAnswerer`] enforces the one rule the
//! retrieval side depends on: with no context there is no answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Returned instead of calling the model when no context was retrieved.
pub const INFORMATION_NOT_FOUND: &str = "Information not found.";

/// Produces an answer to a question from retrieved document context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Answer `question` using only `context`.
    async fn answer(&self, context: &str, question: &str) -> Result<String>;
}

/// Wraps an [`AnswerGenerator`] so blank context short-circuits to
/// [`INFORMATION_NOT_FOUND`].
#[derive(Clone)]
pub struct GroundedAnswerer {
    inner: Arc<dyn AnswerGenerator>,
}

impl GroundedAnswerer {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn AnswerGenerator>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AnswerGenerator for GroundedAnswerer {
    async fn answer(&self, context: &str, question: &str) -> Result<String> {
        if context.trim().is_empty() {
            warn!("context is empty; skipping answer generation");
            return Ok(INFORMATION_NOT_FOUND.to_string());
        }
        self.inner.answer(context, question).await
    }
}

/// Join retrieved chunks into a single context string, one chunk per line.
pub fn join_context(chunks: &[String]) -> String {
    chunks.join("\n")
}

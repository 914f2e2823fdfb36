//! Subcommand implementations.
//!
//! Commands write to a caller-supplied writer so they can be driven from
//! tests without touching the process's stdout.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{error, info};

use docqa_rag::{
    Chunker, DocumentSession, EmbeddingProvider, HashEmbeddingProvider, PageRange, RagConfig,
    RetrievedChunk, WordWindowChunker, extract_text, normalize_text, split_pages,
};

use crate::cli::EmbedderKind;

/// Printed when retrieval returns nothing for a question.
pub const NO_RELEVANT_CONTENT: &str = "No relevant content found.";

/// Read `path` and extract the text of the selected pages.
pub fn load_document(path: &Path, range: PageRange) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let pages = split_pages(&raw);
    let text = extract_text(&pages, range);
    info!(path = %path.display(), page_count = pages.len(), "loaded document");
    Ok(text)
}

/// Questions from `input`, one per non-blank line.
pub fn read_questions(input: &mut dyn BufRead) -> Result<Vec<String>> {
    let mut questions = Vec::new();
    for line in input.lines() {
        let line = line.context("failed to read question from stdin")?;
        let question = line.trim();
        if !question.is_empty() {
            questions.push(question.to_string());
        }
    }
    Ok(questions)
}

/// The embedding provider selected on the command line.
pub fn build_provider(kind: EmbedderKind, dimensions: usize) -> Result<Arc<dyn EmbeddingProvider>> {
    match kind {
        EmbedderKind::Hash => Ok(Arc::new(HashEmbeddingProvider::new(dimensions))),
        EmbedderKind::Gemini => gemini_provider(),
    }
}

#[cfg(feature = "gemini")]
fn gemini_provider() -> Result<Arc<dyn EmbeddingProvider>> {
    let provider = docqa_rag::GeminiEmbeddingProvider::from_env()
        .context("could not configure the Gemini embedder")?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "gemini"))]
fn gemini_provider() -> Result<Arc<dyn EmbeddingProvider>> {
    bail!("docqa was built without the `gemini` feature; use `--embedder hash`")
}

#[derive(Serialize)]
struct ChunkReport<'a> {
    chunk_count: usize,
    chunks: &'a [String],
}

/// Chunk `text` and print the result.
pub fn run_chunk(text: &str, config: &RagConfig, json: bool, out: &mut dyn Write) -> Result<()> {
    let chunker = WordWindowChunker::new(config.chunk_size, config.chunk_overlap)?;
    let chunks = chunker.chunk(&normalize_text(text));

    if json {
        let report = ChunkReport { chunk_count: chunks.len(), chunks: &chunks };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(out, "{} chunks", chunks.len())?;
    for (i, chunk) in chunks.iter().enumerate() {
        writeln!(out, "\n--- chunk {i} ---\n{chunk}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct QueryReport<'a> {
    question: &'a str,
    results: &'a [RetrievedChunk],
}

/// Ingest `text` and print the ranked chunks for each question.
///
/// A failed retrieval is logged and reported like an empty one.
pub async fn run_query(
    text: &str,
    config: RagConfig,
    provider: Arc<dyn EmbeddingProvider>,
    questions: &[String],
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if questions.is_empty() {
        bail!("no questions given; pass --question or pipe them on stdin");
    }

    let mut session =
        DocumentSession::builder().config(config).embedding_provider(provider).build()?;
    let chunk_count = session.ingest(text).await.context("failed to index document")?;
    info!(chunk_count, question_count = questions.len(), "document ready for questions");

    for question in questions {
        let results = match session.try_retrieve(question).await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, question = %question, "error during retrieval");
                Vec::new()
            }
        };

        if json {
            let report = QueryReport { question, results: &results };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
            continue;
        }

        writeln!(out, "Q: {question}")?;
        if results.is_empty() {
            writeln!(out, "{NO_RELEVANT_CONTENT}")?;
        }
        for (rank, result) in results.iter().enumerate() {
            let position = rank + 1;
            writeln!(out, "{position}. [{:.3}] (chunk {}) {}", result.score, result.index, result.text)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

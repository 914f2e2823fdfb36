//! CLI argument parsing using clap.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docqa_rag::{PageRange, RagConfig};

/// Chunk a document and retrieve the passages relevant to a question.
#[derive(Parser, Debug)]
#[command(name = "docqa", version, about = "Chunk a document and retrieve relevant passages")]
pub struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true, env = "DOCQA_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a document into overlapping word windows and print them.
    Chunk {
        #[command(flatten)]
        document: DocumentArgs,

        /// Print the chunks as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Index a document and print the chunks most relevant to each question.
    Query {
        #[command(flatten)]
        document: DocumentArgs,

        /// Question to ask; repeatable. Read line by line from stdin when absent.
        #[arg(short, long = "question", value_name = "QUESTION")]
        questions: Vec<String>,

        /// Embedding backend
        #[arg(long, value_enum, default_value_t = EmbedderKind::Hash, env = "DOCQA_EMBEDDER")]
        embedder: EmbedderKind,

        /// Dimensions of the hashing embedder
        #[arg(long, default_value = "256", env = "DOCQA_DIMENSIONS")]
        dimensions: NonZeroUsize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where embeddings come from.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Offline feature hashing
    Hash,
    /// Gemini embeddings API (needs GEMINI_API_KEY)
    Gemini,
}

/// Document selection and chunking flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Plain-text document; form feeds separate pages
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Maximum words per chunk
    #[arg(long, default_value_t = 500, env = "DOCQA_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Words shared by consecutive chunks
    #[arg(long, default_value_t = 50, env = "DOCQA_OVERLAP")]
    pub overlap: usize,

    /// Chunks returned per question
    #[arg(long, default_value_t = 3, env = "DOCQA_TOP_K")]
    pub top_k: usize,

    /// First page to read (0-based)
    #[arg(long, default_value_t = 0, env = "DOCQA_START_PAGE")]
    pub start_page: usize,

    /// Page to stop before
    #[arg(long, env = "DOCQA_END_PAGE")]
    pub end_page: Option<usize>,

    /// Read at most this many pages
    #[arg(long, env = "DOCQA_MAX_PAGES")]
    pub max_pages: Option<usize>,
}

impl DocumentArgs {
    /// Validated retrieval settings from the flags.
    pub fn rag_config(&self) -> docqa_rag::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.overlap)
            .top_k(self.top_k)
            .build()
    }

    pub fn page_range(&self) -> PageRange {
        PageRange { start: self.start_page, end: self.end_page, max_pages: self.max_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let cli = Cli::try_parse_from(["docqa", "query", "report.txt", "-q", "why?"]).unwrap();
        let Command::Query { document, questions, embedder, dimensions, json } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(document.file, PathBuf::from("report.txt"));
        assert_eq!(questions, vec!["why?"]);
        assert_eq!(embedder, EmbedderKind::Hash);
        assert_eq!(dimensions.get(), 256);
        assert!(!json);
        assert_eq!(document.rag_config().unwrap(), RagConfig::default());
        assert_eq!(document.page_range(), PageRange::all());
    }

    #[test]
    fn repeated_questions_and_page_flags() {
        let cli = Cli::try_parse_from([
            "docqa",
            "query",
            "book.txt",
            "--question",
            "first",
            "-q",
            "second",
            "--start-page",
            "2",
            "--max-pages",
            "5",
            "--embedder",
            "gemini",
        ])
        .unwrap();
        let Command::Query { document, questions, embedder, .. } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(questions, vec!["first", "second"]);
        assert_eq!(embedder, EmbedderKind::Gemini);
        assert_eq!(document.page_range(), PageRange { start: 2, end: None, max_pages: Some(5) });
    }

    #[test]
    fn inconsistent_window_fails_validation() {
        let cli =
            Cli::try_parse_from(["docqa", "chunk", "a.txt", "--chunk-size", "10", "--overlap", "10"])
                .unwrap();
        let Command::Chunk { document, .. } = cli.command else {
            panic!("expected chunk");
        };
        assert!(document.rag_config().is_err());
    }

    #[test]
    fn file_is_required() {
        assert!(Cli::try_parse_from(["docqa", "chunk"]).is_err());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let parsed =
            Cli::try_parse_from(["docqa", "query", "a.txt", "-q", "why?", "--dimensions", "0"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["docqa", "query", "a.txt", "--dimensions", "64"]).unwrap();
        let Command::Query { dimensions, .. } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(dimensions.get(), 64);
    }
}

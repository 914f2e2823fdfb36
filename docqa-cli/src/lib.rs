//! # docqa-cli
//!
//! The `docqa` command: chunk a plain-text document, or index it and print
//! the passages most relevant to one or more questions.
//!
//! ```text
//! docqa chunk report.txt --chunk-size 200 --overlap 20
//! docqa query report.txt -q "What drove revenue growth?" --top-k 5
//! cat questions.txt | docqa query report.txt --json
//! ```

pub mod cli;
pub mod commands;

use std::io::{BufRead, Write};

use anyhow::Result;

use cli::{Cli, Command};

/// Run a parsed command line.
///
/// Questions come from `stdin` when none were passed as flags.
pub async fn run(cli: Cli, stdin: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Command::Chunk { document, json } => {
            let config = document.rag_config()?;
            let text = commands::load_document(&document.file, document.page_range())?;
            commands::run_chunk(&text, &config, json, out)
        }
        Command::Query { document, questions, embedder, dimensions, json } => {
            let config = document.rag_config()?;
            let text = commands::load_document(&document.file, document.page_range())?;
            let provider = commands::build_provider(embedder, dimensions.get())?;
            let questions =
                if questions.is_empty() { commands::read_questions(stdin)? } else { questions };
            commands::run_query(&text, config, provider, &questions, json, out).await
        }
    }
}

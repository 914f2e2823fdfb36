//! Drives the `docqa` command line end to end against files on disk.

use std::io::{Cursor, Write};

use clap::Parser;
use docqa_cli::cli::Cli;
use docqa_cli::commands::NO_RELEVANT_CONTENT;
use tempfile::NamedTempFile;

fn document(pages: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", pages.join("\x0c")).unwrap();
    file
}

async fn run(args: &[&str], stdin: &str) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args)?;
    let mut input = Cursor::new(stdin.to_string());
    let mut out = Vec::new();
    docqa_cli::run(cli, &mut input, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn chunk_respects_page_range() {
    let file = document(&["alpha beta", "gamma delta", "epsilon zeta"]);
    let path = file.path().to_str().unwrap();

    let printed =
        run(&["docqa", "chunk", path, "--chunk-size", "3", "--overlap", "1", "--start-page", "1"], "")
            .await
            .unwrap();
    assert!(printed.starts_with("2 chunks\n"));
    assert!(printed.contains("gamma delta epsilon"));
    assert!(!printed.contains("alpha"));

    let printed = run(
        &["docqa", "chunk", path, "--chunk-size", "3", "--overlap", "1", "--max-pages", "1"],
        "",
    )
    .await
    .unwrap();
    assert!(printed.starts_with("1 chunks\n"));
    assert!(printed.contains("alpha beta"));
}

#[tokio::test]
async fn query_reads_questions_from_stdin() {
    let file = document(&["The cat sat on the mat.", "The dog ran in the park."]);
    let path = file.path().to_str().unwrap();

    let printed = run(
        &["docqa", "query", path, "--chunk-size", "5", "--overlap", "1", "--top-k", "1"],
        "Where did the cat sit?\n\nWhere did the dog run?\n",
    )
    .await
    .unwrap();

    assert!(printed.contains("Q: Where did the cat sit?\n1. ["));
    assert!(printed.contains("Q: Where did the dog run?\n1. ["));
    assert!(!printed.contains("2. ["));
}

#[tokio::test]
async fn pages_outside_range_leave_nothing_to_index() {
    let file = document(&["only page"]);
    let path = file.path().to_str().unwrap();

    let err = run(&["docqa", "query", path, "--start-page", "4", "-q", "anything"], "")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to index document"));
    assert!(!err.to_string().contains(NO_RELEVANT_CONTENT));
}

#[tokio::test]
async fn missing_file_is_reported() {
    let err = run(&["docqa", "chunk", "/definitely/not/here.txt"], "").await.unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

//! Document text preparation and retrieval result types.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Form feed, the page separator in text exported from paged documents.
const PAGE_BREAK: char = '\x0c';

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split plain text into pages on form-feed characters.
///
/// Text without a form feed is a single page. A trailing form feed does not
/// open an extra empty page.
pub fn split_pages(raw: &str) -> Vec<&str> {
    let raw = raw.strip_suffix(PAGE_BREAK).unwrap_or(raw);
    raw.split(PAGE_BREAK).collect()
}

/// The pages to take from a paged document.
///
/// `start` is inclusive and `end` exclusive, both zero-based. A missing `end`
/// means the last page. `max_pages` caps the number of pages taken from
/// `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// First page to extract.
    pub start: usize,
    /// Page to stop before; `None` means the end of the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    /// Upper bound on the number of pages extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,
}

impl PageRange {
    /// Every page of the document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Resolve this range against a document with `total` pages.
    ///
    /// Returns the clamped `(start, end)` pair; `start == end` means nothing
    /// is selected.
    pub fn resolve(&self, total: usize) -> (usize, usize) {
        let mut end = self.end.map_or(total, |end| end.min(total));
        if let Some(max) = self.max_pages {
            end = end.min(self.start.saturating_add(max));
        }
        let start = self.start.min(end);
        (start, end)
    }
}

/// Concatenate the selected pages and normalize the result.
pub fn extract_text(pages: &[&str], range: PageRange) -> String {
    let (start, end) = range.resolve(pages.len());
    info!(start, end, total_pages = pages.len(), "extracting text from pages");

    let mut text = String::new();
    for page in &pages[start..end] {
        text.push_str(page);
        text.push(' ');
    }
    normalize_text(&text)
}

/// A retrieved chunk paired with its similarity to the question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// Position of the chunk in the session's chunk list.
    pub index: usize,
    /// The chunk text.
    pub text: String,
    /// Cosine similarity to the question (higher is more relevant).
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  The  cat\n\tsat \r\n on\u{a0}the mat.  "), "The cat sat on the mat.");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn split_pages_on_form_feed() {
        assert_eq!(split_pages("one\x0ctwo\x0cthree\x0c"), vec!["one", "two", "three"]);
        assert_eq!(split_pages("single page"), vec!["single page"]);
    }

    #[test]
    fn range_defaults_to_whole_document() {
        assert_eq!(PageRange::all().resolve(4), (0, 4));
    }

    #[test]
    fn range_clamps_end_to_page_count() {
        let range = PageRange { start: 1, end: Some(10), max_pages: None };
        assert_eq!(range.resolve(3), (1, 3));
    }

    #[test]
    fn max_pages_limits_from_start() {
        let range = PageRange { start: 1, end: None, max_pages: Some(2) };
        assert_eq!(range.resolve(10), (1, 3));
    }

    #[test]
    fn start_past_end_selects_nothing() {
        let range = PageRange { start: 7, end: None, max_pages: None };
        assert_eq!(range.resolve(3), (3, 3));
        assert_eq!(extract_text(&["a", "b", "c"], range), "");
    }

    #[test]
    fn extract_joins_pages_with_space() {
        let pages = split_pages("first\npage\x0csecond page\x0cthird");
        let range = PageRange { start: 0, end: Some(2), max_pages: None };
        assert_eq!(extract_text(&pages, range), "first page second page");
    }
}

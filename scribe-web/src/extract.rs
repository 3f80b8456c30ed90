//! Main-content extraction from downloaded HTML.
//!
//! Comments and tables are removed from the parsed document before the
//! readability pass so that comment threads and tabular debris never reach
//! the corpus.
use anyhow::{Context, Result};
use scraper::{Html, Node};
use std::io::Cursor;
use url::Url;

/// Readable content of one HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Document title, when the page declares a non-blank one.
    pub title: Option<String>,
    /// Main text, one trimmed non-empty line per block.
    pub text: String,
}

/// Extract the main readable text of `html`, fetched from `url`.
///
/// An empty `text` means the document had nothing readable; the caller decides
/// what to do with that.
pub fn extract_main_content(html: &str, url: &str) -> Result<ExtractedContent> {
    let base = Url::parse(url).with_context(|| format!("invalid page url {url:?}"))?;
    let cleaned = strip_excluded(html);

    let mut cursor = Cursor::new(cleaned.as_bytes());
    let product = readability::extractor::extract(&mut cursor, &base)
        .context("readability extraction failed")?;

    let title = Some(product.title.trim().to_string()).filter(|t| !t.is_empty());
    Ok(ExtractedContent {
        title,
        text: normalize_whitespace(&product.text),
    })
}

/// Drop HTML comments and `<table>` elements, nested ones included, and
/// serialize the remaining document.
fn strip_excluded(html: &str) -> String {
    let mut document = Html::parse_document(html);
    let doomed: Vec<_> = document
        .tree
        .nodes()
        .filter(|node| match node.value() {
            Node::Comment(_) => true,
            Node::Element(el) => el.name() == "table",
            _ => false,
        })
        .map(|node| node.id())
        .collect();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    document.html()
}

/// Trim every line and drop the empty ones.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

use serde::{Deserialize, Serialize};
use url::Url;

/// Appended once to text that was cut to the character budget.
pub const TRUNCATION_MARKER: char = '\u{2026}';

/// Character budget applied when the caller does not choose one.
pub const DEFAULT_PER_PAGE_LIMIT: usize = 8000;

/// The unit the acquisition pipeline produces, whichever tier found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPage {
    pub url: String,
    pub title: String,
    pub text: String,
}

impl CanonicalPage {
    /// Materialize a page, or `None` when the url or the trimmed text is empty.
    ///
    /// Text is trimmed and cut to `budget` characters; a missing or blank title
    /// falls back to [`origin`].
    ///
    /// ```
    /// use scribe_common::CanonicalPage;
    ///
    /// assert!(CanonicalPage::build("https://example.com", Some("T"), "   ", 10).is_none());
    /// assert!(CanonicalPage::build("", Some("T"), "body", 10).is_none());
    ///
    /// let page = CanonicalPage::build("https://example.com", Some(" T "), "0123456789ABCDEF", 10).unwrap();
    /// assert_eq!(page.title, "T");
    /// assert_eq!(page.text, "0123456789\u{2026}");
    /// ```
    pub fn build(url: &str, title: Option<&str>, text: &str, budget: usize) -> Option<Self> {
        let url = url.trim();
        let text = text.trim();
        if url.is_empty() || text.is_empty() {
            return None;
        }

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| origin(url));

        Some(Self {
            url: url.to_string(),
            title,
            text: truncate_text(text, budget),
        })
    }
}

/// Cut `text` to exactly `budget` characters plus [`TRUNCATION_MARKER`] when it
/// is longer; otherwise return it untouched.
pub fn truncate_text(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len_utf8());
            out.push_str(&text[..cut]);
            out.push(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}

/// Network location of `url` (host, plus port when explicit); the raw string
/// when it has none.
pub fn origin(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) if !host.is_empty() => format!("{host}:{port}"),
        (Some(host), None) if !host.is_empty() => host.to_string(),
        _ => url.to_string(),
    }
}

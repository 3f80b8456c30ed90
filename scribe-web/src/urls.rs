//! Cleanup for URLs typed or pasted by a person.
//!
//! Best effort only: nothing here validates that a token is a URL, and
//! duplicates are kept so a source can be weighted by repetition.

/// Quote characters that word processors and chat clients wrap around links.
const QUOTE_CHARS: &[char] = &['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '"', '\''];

/// En dash, em dash and minus sign, all rewritten to `-`.
const DASH_VARIANTS: &[char] = &['\u{2013}', '\u{2014}', '\u{2212}'];

/// Split free text on commas and any whitespace, dropping empty tokens.
pub fn split_url_text(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim whitespace and smart quotes from both ends and replace unicode dashes.
///
/// ```
/// use scribe_web::urls::normalize_url;
///
/// assert_eq!(normalize_url("“https://example.com/a\u{2013}b”"), "https://example.com/a-b");
/// ```
pub fn normalize_url(token: &str) -> String {
    token
        .trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c))
        .chars()
        .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
        .collect()
}

/// Split, normalize, and drop tokens that were nothing but quotes.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    split_url_text(raw)
        .iter()
        .map(|token| normalize_url(token))
        .filter(|url| !url.is_empty())
        .collect()
}

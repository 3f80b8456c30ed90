//! Character-set resolution for downloaded documents.
//!
//! The `Content-Type` header wins; otherwise the first 1024 bytes are scanned
//! for a `<meta charset>` or `http-equiv` declaration; otherwise UTF-8. A byte
//! order mark overrides all of these.
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// How far into the document a `<meta>` declaration is looked for.
const PRESCAN_LIMIT: usize = 1024;

/// Decode `bytes` using the declared character set.
///
/// Returns the text and the name of the encoding that was applied.
pub fn decode_document(headers: &HeaderMap, bytes: &[u8]) -> (String, &'static str) {
    let encoding = header_charset(headers)
        .or_else(|| meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), used.name())
}

fn header_charset(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    charset_param(&value.to_ascii_lowercase())
}

fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(PRESCAN_LIMIT)];
    let lowered = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = lowered.as_str();
    while let Some(at) = rest.find("<meta") {
        rest = &rest[at + "<meta".len()..];
        let tag = &rest[..rest.find('>').unwrap_or(rest.len())];
        if let Some(label) = charset_param(tag) {
            return Some(label);
        }
    }
    None
}

/// Value of the first `charset=` in `s` (already lowercased), unquoted.
fn charset_param(s: &str) -> Option<String> {
    let at = s.find("charset")?;
    let after = s[at + "charset".len()..].trim_start();
    let value = after.strip_prefix('=')?.trim_start();
    let value = value.trim_start_matches(['"', '\'']);
    let label: String = value
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        .collect();
    (!label.is_empty()).then_some(label)
}

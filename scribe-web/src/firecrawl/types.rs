//! Field resolution for Firecrawl payloads.
//!
//! The service has returned rows under several container keys, and each row
//! may name its fields differently depending on the API version. Every lookup
//! here walks an ordered list of synonyms and takes the first non-empty string.
use serde_json::{Map, Value};

/// Container keys that may hold the batch rows, in priority order.
pub const ROW_CONTAINER_KEYS: &[&str] = &["data", "results", "result"];

/// Keys that may carry a row's source URL.
pub const URL_KEYS: &[&str] = &["url", "sourceUrl", "link", "pageUrl"];

pub const TITLE_KEY: &str = "title";

/// Batch rows: rich formatted content first, raw markup as a last resort.
pub const BATCH_TEXT_KEYS: &[&str] = &["markdown", "content", "text", "html"];

/// Single-page scrape responses put plain content ahead of markdown.
pub const SCRAPE_TEXT_KEYS: &[&str] = &["content", "markdown", "text", "html"];

/// Wrapper key for the interesting fields of a scrape response.
pub const SCRAPE_DATA_KEY: &str = "data";

/// One loosely-typed record from a batch response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(Map<String, Value>);

impl RawRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// A row that only knows its URL (used for bare-list items).
    pub fn from_url(url: String) -> Self {
        let mut fields = Map::new();
        fields.insert("url".to_string(), Value::String(url));
        Self(fields)
    }

    pub fn url(&self) -> Option<&str> {
        first_string(&self.0, URL_KEYS)
    }

    pub fn title(&self) -> Option<&str> {
        first_string(&self.0, &[TITLE_KEY])
    }

    pub fn text(&self) -> Option<&str> {
        first_string(&self.0, BATCH_TEXT_KEYS)
    }
}

/// Title and body pulled from a single-page scrape response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedFields<'a> {
    pub title: Option<&'a str>,
    pub text: Option<&'a str>,
}

/// First value among `keys` that is a string with non-whitespace content,
/// trimmed.
pub fn first_string<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| fields.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Normalize a batch response into rows.
///
/// A bare list yields one row per item, with non-object items treated as
/// URLs. An object yields the items of the first container key holding a list
/// (non-object items become empty rows). Anything else yields nothing.
pub fn extract_rows(payload: &Value) -> Vec<RawRow> {
    match payload {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => RawRow::new(fields.clone()),
                Value::String(s) => RawRow::from_url(s.clone()),
                other => RawRow::from_url(other.to_string()),
            })
            .collect(),
        Value::Object(fields) => ROW_CONTAINER_KEYS
            .iter()
            .find_map(|k| fields.get(*k).and_then(Value::as_array))
            .map(|items| {
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(fields) => RawRow::new(fields.clone()),
                        _ => RawRow::default(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Resolve title and text from a scrape response, unwrapping a nested `data`
/// object when present.
pub fn scraped_fields(payload: &Value) -> ScrapedFields<'_> {
    let Some(outer) = payload.as_object() else {
        return ScrapedFields::default();
    };
    let record = outer
        .get(SCRAPE_DATA_KEY)
        .and_then(Value::as_object)
        .unwrap_or(outer);

    let title = first_string(record, &[TITLE_KEY]).or_else(|| {
        record
            .get("metadata")
            .and_then(Value::as_object)
            .and_then(|meta| first_string(meta, &[TITLE_KEY]))
    });

    ScrapedFields {
        title,
        text: first_string(record, SCRAPE_TEXT_KEYS),
    }
}

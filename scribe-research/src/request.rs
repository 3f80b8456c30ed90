use scribe_common::{DEFAULT_PER_PAGE_LIMIT, Result, ScribeError};
use scribe_web::urls::parse_url_list;

pub const DEFAULT_MAX_URLS: usize = 8;
pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic.";

/// A validated request for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub topic: String,
    /// Normalized URLs in the order given; empty means "use the defaults".
    pub urls: Vec<String>,
    pub max_urls: usize,
    pub per_page_limit: usize,
}

impl ReportRequest {
    /// Build a request from raw user input.
    ///
    /// `url_text` is free-form (commas, spaces or newlines between URLs). A
    /// blank topic is rejected with a message meant for the user.
    pub fn new(
        topic: &str,
        url_text: &str,
        max_urls: Option<usize>,
        per_page_limit: Option<usize>,
    ) -> Result<Self> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ScribeError::InvalidRequest(EMPTY_TOPIC_MESSAGE.into()));
        }
        Ok(Self {
            topic: topic.to_string(),
            urls: parse_url_list(url_text),
            max_urls: max_urls.unwrap_or(DEFAULT_MAX_URLS),
            per_page_limit: per_page_limit.unwrap_or(DEFAULT_PER_PAGE_LIMIT),
        })
    }

    /// The first `max_urls` of the supplied URLs, or of `defaults` when none
    /// were supplied.
    pub fn effective_urls(&self, defaults: &[String]) -> Vec<String> {
        let source = if self.urls.is_empty() {
            defaults
        } else {
            &self.urls
        };
        source.iter().take(self.max_urls).cloned().collect()
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use scribe_common::ScribeError;
use scribe_http::HttpClient;
use serde_json::{Value, json};
use std::time::{Duration, Instant};

pub const FIRECRAWL_API_BASE: &str = "https://api.firecrawl.dev";
pub const DEFAULT_FIRECRAWL_TIMEOUT: Duration = Duration::from_secs(60);

/// Remote content-extraction service.
///
/// Both calls return the raw JSON document; interpreting it is the caller's
/// job (see [`super::types`]).
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract clean content for a batch of URLs in one request.
    async fn extract_batch(&self, urls: &[String]) -> Result<Value>;

    /// Fetch clean content for a single page.
    async fn scrape_page(&self, url: &str) -> Result<Value>;
}

/// Firecrawl REST client (`v1/extract` and `v1/scrape`).
#[derive(Clone)]
pub struct FirecrawlClient {
    http: HttpClient,
    api_key: String,
}

impl FirecrawlClient {
    /// A blank key is rejected here so the problem surfaces at startup.
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> scribe_common::Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ScribeError::Config("Firecrawl API key missing".into()));
        }
        let http = HttpClient::new(base_url)
            .map_err(|e| ScribeError::Config(format!("Firecrawl base URL invalid: {e}")))?
            .with_timeout(timeout);
        Ok(Self { http, api_key })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let got: Value = self
            .http
            .post_json(path, body, &self.api_key)
            .await
            .with_context(|| format!("firecrawl {path}"))?;
        Ok(got)
    }
}

#[async_trait]
impl ExtractionService for FirecrawlClient {
    async fn extract_batch(&self, urls: &[String]) -> Result<Value> {
        let started = Instant::now();
        tracing::info!(target: "web.firecrawl", url_count = urls.len(), "firecrawl.extract.start");

        match self.post("v1/extract", &json!({ "urls": urls })).await {
            Ok(v) => {
                tracing::info!(
                    target: "web.firecrawl",
                    url_count = urls.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "firecrawl.extract.ok"
                );
                Ok(v)
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.firecrawl",
                    url_count = urls.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %format!("{e:#}"),
                    "firecrawl.extract.error"
                );
                Err(e)
            }
        }
    }

    async fn scrape_page(&self, url: &str) -> Result<Value> {
        let started = Instant::now();
        tracing::debug!(target: "web.firecrawl", %url, "firecrawl.scrape.start");

        let body = json!({ "url": url, "formats": ["markdown"] });
        match self.post("v1/scrape", &body).await {
            Ok(v) => {
                tracing::debug!(
                    target: "web.firecrawl",
                    %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "firecrawl.scrape.ok"
                );
                Ok(v)
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.firecrawl",
                    %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %format!("{e:#}"),
                    "firecrawl.scrape.error"
                );
                Err(e)
            }
        }
    }
}

//! Last-resort tier: download each page ourselves and extract its main text.
use crate::extract::extract_main_content;
use crate::outcome::Outcome;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scribe_common::CanonicalPage;
use scribe_http::HttpClient;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Downloads a page body as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] over plain HTTP GET, following redirects.
#[derive(Clone)]
pub struct HttpPageFetcher {
    http: HttpClient,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::for_pages(user_agent)
            .context("building page fetcher")?
            .with_timeout(timeout);
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self
            .http
            .get_text(url)
            .await
            .with_context(|| format!("fetching {url}"))?;
        Ok(body)
    }
}

/// Fetch-and-extract over a URL list with bounded concurrency.
#[derive(Clone)]
pub struct DirectExtractor {
    fetcher: Arc<dyn PageFetcher>,
    concurrency: usize,
}

impl DirectExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Pages for every URL that downloaded and had readable text, in input
    /// order. Individual failures are logged and skipped.
    pub async fn acquire(&self, urls: &[String], budget: usize) -> Outcome<Vec<CanonicalPage>> {
        let outcomes: Vec<Outcome<CanonicalPage>> = stream::iter(urls)
            .map(|url| self.fetch_one(url, budget))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Failed(_)))
            .count();
        let pages: Vec<CanonicalPage> = outcomes.into_iter().filter_map(Outcome::into_option).collect();

        tracing::info!(
            target: "web.direct",
            requested = urls.len(),
            acquired = pages.len(),
            failed,
            "direct.acquire.done"
        );
        Outcome::from_items(pages)
    }

    /// Download and extract a single page.
    pub async fn fetch_one(&self, url: &str, budget: usize) -> Outcome<CanonicalPage> {
        let started = Instant::now();
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    target: "web.direct",
                    %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %format!("{e:#}"),
                    "direct.fetch.error"
                );
                return Outcome::Failed(format!("{e:#}"));
            }
        };
        if html.trim().is_empty() {
            tracing::debug!(target: "web.direct", %url, "direct.fetch.empty_body");
            return Outcome::Empty;
        }

        let content = match extract_main_content(&html, url) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(target: "web.direct", %url, error = %format!("{e:#}"), "direct.extract.error");
                return Outcome::Failed(format!("{e:#}"));
            }
        };

        match CanonicalPage::build(url, content.title.as_deref(), &content.text, budget) {
            Some(page) => {
                tracing::debug!(
                    target: "web.direct",
                    %url,
                    chars = page.text.chars().count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "direct.fetch.ok"
                );
                Outcome::Acquired(page)
            }
            None => {
                tracing::debug!(target: "web.direct", %url, "direct.extract.empty");
                Outcome::Empty
            }
        }
    }
}

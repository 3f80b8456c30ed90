//! Tiered content acquisition.
//!
//! Tier 1 is the extraction service: one batch call, plus one single-page
//! scrape for each row that came back without text. Tier 2, direct download
//! with local extraction, only runs when tier 1 produced nothing at all.
use crate::direct::DirectExtractor;
use crate::firecrawl::{ExtractionService, RawRow, extract_rows, scraped_fields};
use crate::outcome::Outcome;
use scribe_common::CanonicalPage;
use std::sync::Arc;
use std::time::Instant;

pub struct AcquisitionPipeline {
    service: Arc<dyn ExtractionService>,
    direct: DirectExtractor,
}

impl AcquisitionPipeline {
    pub fn new(service: Arc<dyn ExtractionService>, direct: DirectExtractor) -> Self {
        Self { service, direct }
    }

    /// Turn `urls` into canonical pages, each text capped at `budget`
    /// characters. Returns an empty list when every tier came up dry.
    pub async fn acquire(&self, urls: &[String], budget: usize) -> Vec<CanonicalPage> {
        let started = Instant::now();

        tracing::info!(target: "scribe.pipeline", tier = "service", urls = urls.len(), "scribe.pipeline.tier.start");
        let first = self.service_tier(urls, budget).await;
        tracing::info!(target: "scribe.pipeline", tier = "service", outcome = first.kind(), "scribe.pipeline.tier.done");

        let outcome = match first {
            Outcome::Acquired(pages) => Outcome::Acquired(pages),
            Outcome::Empty | Outcome::Failed(_) => {
                tracing::info!(target: "scribe.pipeline", tier = "direct", urls = urls.len(), "scribe.pipeline.tier.start");
                let second = self.direct.acquire(urls, budget).await;
                tracing::info!(target: "scribe.pipeline", tier = "direct", outcome = second.kind(), "scribe.pipeline.tier.done");
                second
            }
        };

        let pages = outcome.into_items();
        tracing::info!(
            target: "scribe.pipeline",
            pages = pages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scribe.pipeline.done"
        );
        pages
    }

    /// Batch extraction, then one scrape per row that has a URL but no text.
    pub async fn service_tier(&self, urls: &[String], budget: usize) -> Outcome<Vec<CanonicalPage>> {
        if urls.is_empty() {
            return Outcome::Empty;
        }

        let payload = match self.service.extract_batch(urls).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "scribe.pipeline", error = %format!("{e:#}"), "scribe.pipeline.batch.failed");
                return Outcome::Failed(format!("{e:#}"));
            }
        };

        let rows = extract_rows(&payload);
        if rows.is_empty() {
            tracing::warn!(target: "scribe.pipeline", "scribe.pipeline.batch.no_rows");
        }

        let mut pages = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let Some(url) = row.url() else {
                tracing::warn!(target: "scribe.pipeline", row = idx, "scribe.pipeline.row.no_url");
                continue;
            };
            let page = match row.text() {
                Some(text) => CanonicalPage::build(url, row.title(), text, budget),
                None => self.scrape_row(url, row, budget).await.into_option(),
            };
            if let Some(page) = page {
                pages.push(page);
            }
        }

        Outcome::from_items(pages)
    }

    async fn scrape_row(&self, url: &str, row: &RawRow, budget: usize) -> Outcome<CanonicalPage> {
        let payload = match self.service.scrape_page(url).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "scribe.pipeline", %url, error = %format!("{e:#}"), "scribe.pipeline.scrape.failed");
                return Outcome::Failed(format!("{e:#}"));
            }
        };

        let fields = scraped_fields(&payload);
        let Some(text) = fields.text else {
            tracing::warn!(target: "scribe.pipeline", %url, "scribe.pipeline.scrape.no_text");
            return Outcome::Empty;
        };
        let title = fields.title.or_else(|| row.title());
        match CanonicalPage::build(url, title, text, budget) {
            Some(page) => Outcome::Acquired(page),
            None => Outcome::Empty,
        }
    }
}

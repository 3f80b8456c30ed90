use crate::request::ReportRequest;
use crate::synth::Synthesizer;
use scribe_common::{CanonicalPage, Result, ScribeError};
use scribe_config::ScribeConfig;
use scribe_llm::openai::OpenAiClient;
use scribe_web::AcquisitionPipeline;
use scribe_web::direct::{DirectExtractor, HttpPageFetcher};
use scribe_web::firecrawl::FirecrawlClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const REPORT_HEADING: &str = "## Enhanced Research Report";
pub const NO_CONTENT_MESSAGE: &str = "Could not scrape any content. Try different article URLs.";

/// A finished report and the pages it was written from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub topic: String,
    /// Heading, blank line, then the model output untouched.
    pub markdown: String,
    pub sources: Vec<CanonicalPage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Report(Report),
    /// Every acquisition tier came up empty; synthesis was not attempted.
    NoContent { message: String },
}

/// Runs one request end to end: URLs, acquisition, synthesis.
pub struct ReportService {
    pipeline: AcquisitionPipeline,
    synthesizer: Synthesizer,
    default_urls: Vec<String>,
}

impl ReportService {
    pub fn new(
        pipeline: AcquisitionPipeline,
        synthesizer: Synthesizer,
        default_urls: Vec<String>,
    ) -> Self {
        Self {
            pipeline,
            synthesizer,
            default_urls,
        }
    }

    /// Wire the production adapters from configuration.
    ///
    /// Fails with [`ScribeError::Config`] when either API key is missing.
    pub fn from_config(cfg: &ScribeConfig) -> Result<Self> {
        let firecrawl_key = cfg
            .firecrawl
            .api_key
            .clone()
            .ok_or_else(|| ScribeError::Config("FIRECRAWL_API_KEY is not set".into()))?;
        let openai_key = cfg
            .openai
            .api_key
            .clone()
            .ok_or_else(|| ScribeError::Config("OPENAI_API_KEY is not set".into()))?;

        let firecrawl = FirecrawlClient::new(
            firecrawl_key,
            &cfg.firecrawl.base_url,
            Duration::from_secs(cfg.firecrawl.timeout_secs),
        )?;
        let fetcher = HttpPageFetcher::new(
            &cfg.research.user_agent,
            Duration::from_secs(cfg.research.fetch_timeout_secs),
        )?;
        let direct = DirectExtractor::new(Arc::new(fetcher), cfg.research.fetch_concurrency);
        let llm = OpenAiClient::with_endpoint(
            openai_key,
            cfg.openai.model.clone(),
            &cfg.openai.endpoint,
            Duration::from_secs(cfg.openai.timeout_secs),
        )?;

        tracing::debug!(
            firecrawl_base = %cfg.firecrawl.base_url,
            openai_endpoint = %cfg.openai.endpoint,
            model = %cfg.openai.model,
            "scribe.service.configured"
        );

        Ok(Self::new(
            AcquisitionPipeline::new(Arc::new(firecrawl), direct),
            Synthesizer::new(Arc::new(llm)),
            cfg.research.default_urls.clone(),
        ))
    }

    pub async fn run(&self, request: &ReportRequest) -> Result<ReportOutcome> {
        let started = Instant::now();
        let urls = self.effective_urls(request);
        tracing::info!(
            target: "scribe.service",
            topic = %request.topic,
            urls = ?urls,
            per_page_limit = request.per_page_limit,
            "scribe.report.start"
        );

        let pages = self.pipeline.acquire(&urls, request.per_page_limit).await;
        if pages.is_empty() {
            tracing::warn!(target: "scribe.service", topic = %request.topic, "scribe.report.no_content");
            return Ok(ReportOutcome::NoContent {
                message: NO_CONTENT_MESSAGE.to_string(),
            });
        }

        let body = self.synthesizer.synthesize(&request.topic, &pages).await?;
        tracing::info!(
            target: "scribe.service",
            topic = %request.topic,
            sources = pages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scribe.report.done"
        );

        Ok(ReportOutcome::Report(Report {
            topic: request.topic.clone(),
            markdown: format!("{REPORT_HEADING}\n\n{body}"),
            sources: pages,
        }))
    }

    pub fn effective_urls(&self, request: &ReportRequest) -> Vec<String> {
        request.effective_urls(&self.default_urls)
    }
}

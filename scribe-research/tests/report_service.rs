mod common;
use anyhow::anyhow;
use async_trait::async_trait;
use scribe_common::{Result, ScribeError};
use scribe_config::ScribeConfig;
use scribe_llm::traits::{LlmClient, LlmResponse};
use scribe_research::{ReportOutcome, ReportRequest, ReportService, Synthesizer};
use scribe_web::AcquisitionPipeline;
use scribe_web::direct::{DirectExtractor, PageFetcher};
use scribe_web::firecrawl::ExtractionService;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

struct FakeService {
    batch: Option<Value>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl FakeService {
    fn new(batch: Option<Value>) -> Arc<Self> {
        Arc::new(Self {
            batch,
            batches: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ExtractionService for FakeService {
    async fn extract_batch(&self, urls: &[String]) -> anyhow::Result<Value> {
        self.batches.lock().unwrap().push(urls.to_vec());
        self.batch.clone().ok_or_else(|| anyhow!("service unavailable"))
    }

    async fn scrape_page(&self, url: &str) -> anyhow::Result<Value> {
        Err(anyhow!("scrape failed for {url}"))
    }
}

struct DeadFetcher;

#[async_trait]
impl PageFetcher for DeadFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        Err(anyhow!("connection refused: {url}"))
    }
}

struct FakeLlm {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some("fake".into()),
                tokens_used: None,
            }),
            Err(reason) => Err(ScribeError::Transport(reason.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

fn defaults() -> Vec<String> {
    (1..=6).map(|i| format!("https://default{i}.example/")).collect()
}

fn service(fc: Arc<FakeService>, llm: Arc<FakeLlm>) -> ReportService {
    let pipeline = AcquisitionPipeline::new(fc, DirectExtractor::new(Arc::new(DeadFetcher), 2));
    ReportService::new(pipeline, Synthesizer::new(llm), defaults())
}

#[tokio::test]
async fn report_wraps_model_output_under_heading() {
    common::init_test_tracing();
    let fc = FakeService::new(Some(json!({"data": [
        {"url": "https://a.com/story", "title": "Story A", "markdown": "alpha findings"},
        {"url": "https://b.com/post", "content": "beta findings"}
    ]})));
    let llm = FakeLlm::replying("Overview [1] and [2].");

    let req = ReportRequest::new("grid storage", "https://a.com/story https://b.com/post", None, None)
        .unwrap();
    let outcome = service(fc, llm.clone()).run(&req).await.unwrap();

    let ReportOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(report.topic, "grid storage");
    assert_eq!(
        report.markdown,
        "## Enhanced Research Report\n\nOverview [1] and [2]."
    );
    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.sources[1].title, "b.com");

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[1] Story A \u{2014} https://a.com/story\nalpha findings\n"));
    assert!(prompts[0].contains("[2] b.com \u{2014} https://b.com/post\nbeta findings\n"));
    assert!(prompts[0].contains("grid storage"));
}

#[tokio::test]
async fn no_content_skips_synthesis() {
    common::init_test_tracing();
    let fc = FakeService::new(None);
    let llm = FakeLlm::replying("unused");

    let req = ReportRequest::new("anything", "https://x.com https://y.com", None, None).unwrap();
    let outcome = service(fc, llm.clone()).run(&req).await.unwrap();

    assert_eq!(
        outcome,
        ReportOutcome::NoContent {
            message: "Could not scrape any content. Try different article URLs.".into()
        }
    );
    assert!(llm.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn default_urls_are_used_and_capped() {
    common::init_test_tracing();
    let fc = FakeService::new(Some(json!([])));
    let llm = FakeLlm::replying("unused");

    let req = ReportRequest::new("ai news", "", Some(3), None).unwrap();
    let outcome = service(fc.clone(), llm).run(&req).await.unwrap();

    assert!(matches!(outcome, ReportOutcome::NoContent { .. }));
    assert_eq!(*fc.batches.lock().unwrap(), vec![defaults()[..3].to_vec()]);
}

#[tokio::test]
async fn synthesis_failure_propagates() {
    common::init_test_tracing();
    let fc = FakeService::new(Some(json!([{"url": "https://a.com", "markdown": "text"}])));
    let llm = FakeLlm::failing("upstream 500");

    let req = ReportRequest::new("topic", "https://a.com", None, None).unwrap();
    let err = service(fc, llm).run(&req).await.unwrap_err();

    assert!(matches!(err, ScribeError::Transport(msg) if msg == "upstream 500"));
}

#[test]
fn missing_credentials_are_config_errors() {
    let mut cfg = ScribeConfig::default();
    cfg.openai.api_key = Some("sk-test".into());
    assert!(matches!(
        ReportService::from_config(&cfg),
        Err(ScribeError::Config(_))
    ));

    cfg.firecrawl.api_key = Some("fc-test".into());
    cfg.openai.api_key = None;
    assert!(matches!(
        ReportService::from_config(&cfg),
        Err(ScribeError::Config(_))
    ));
}

#[test]
fn complete_config_builds_service() {
    let mut cfg = ScribeConfig::default();
    cfg.firecrawl.api_key = Some("fc-test".into());
    cfg.openai.api_key = Some("sk-test".into());
    let svc = ReportService::from_config(&cfg).expect("service builds");

    let req = ReportRequest::new("topic", "", None, None).unwrap();
    assert_eq!(svc.effective_urls(&req).len(), 6);
}

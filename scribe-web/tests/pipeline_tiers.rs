mod common;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use scribe_common::CanonicalPage;
use scribe_web::AcquisitionPipeline;
use scribe_web::direct::{DirectExtractor, PageFetcher};
use scribe_web::firecrawl::ExtractionService;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted extraction service that records every call.
#[derive(Default)]
struct FakeService {
    batch: Option<Value>,
    scrapes: HashMap<String, Value>,
    batch_calls: AtomicUsize,
    scrape_calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ExtractionService for FakeService {
    async fn extract_batch(&self, _urls: &[String]) -> Result<Value> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.batch.clone().ok_or_else(|| anyhow!("batch endpoint down"))
    }

    async fn scrape_page(&self, url: &str) -> Result<Value> {
        self.scrape_calls.lock().unwrap().push(url.to_string());
        self.scrapes
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("scrape failed for {url}"))
    }
}

/// Page fetcher serving canned HTML and recording which URLs were requested.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("404 for {url}"))
    }
}

fn article(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body><article>\
         <p>{body} {body} {body}</p><p>{body} and then some more words to make this a real paragraph.</p>\
         </article></body></html>"
    )
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn pipeline(service: Arc<FakeService>, fetcher: Arc<FakeFetcher>) -> AcquisitionPipeline {
    AcquisitionPipeline::new(service, DirectExtractor::new(fetcher, 2))
}

#[tokio::test]
async fn batch_rows_with_text_become_pages_and_textless_rows_are_scraped_once() {
    common::init_test_tracing();
    let service = Arc::new(FakeService {
        batch: Some(json!({"data": [
            {"url": "https://a.com/x", "title": "A", "markdown": "alpha text"},
            {"url": "https://b.com/y", "title": "B"}
        ]})),
        scrapes: HashMap::from([(
            "https://b.com/y".to_string(),
            json!({"data": {"content": "beta text"}}),
        )]),
        ..Default::default()
    });
    let fetcher = Arc::new(FakeFetcher::default());

    let pages = pipeline(service.clone(), fetcher.clone())
        .acquire(&urls(&["https://a.com/x", "https://b.com/y"]), 8000)
        .await;

    assert_eq!(
        pages,
        vec![
            CanonicalPage {
                url: "https://a.com/x".into(),
                title: "A".into(),
                text: "alpha text".into()
            },
            CanonicalPage {
                url: "https://b.com/y".into(),
                title: "B".into(),
                text: "beta text".into()
            },
        ]
    );
    assert_eq!(service.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*service.scrape_calls.lock().unwrap(), vec!["https://b.com/y"]);
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bare_list_rows_fall_back_to_host_titles() {
    common::init_test_tracing();
    let service = Arc::new(FakeService {
        batch: Some(json!(["https://a.com/page"])),
        scrapes: HashMap::from([(
            "https://a.com/page".to_string(),
            json!({"markdown": "scraped body"}),
        )]),
        ..Default::default()
    });

    let pages = pipeline(service, Arc::new(FakeFetcher::default()))
        .acquire(&urls(&["https://a.com/page"]), 8000)
        .await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "a.com");
    assert_eq!(pages[0].text, "scraped body");
}

#[tokio::test]
async fn rows_without_url_are_skipped_and_failed_scrapes_dropped() {
    common::init_test_tracing();
    let service = Arc::new(FakeService {
        batch: Some(json!({"results": [
            {"title": "orphan", "markdown": "no url here"},
            {"url": "https://c.com", "title": "C"},
            {"link": "https://d.com", "content": "delta"}
        ]})),
        ..Default::default()
    });
    let fetcher = Arc::new(FakeFetcher::default());

    let pages = pipeline(service.clone(), fetcher.clone())
        .acquire(&urls(&["https://c.com", "https://d.com"]), 8000)
        .await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, "https://d.com");
    assert_eq!(pages[0].title, "d.com");
    assert_eq!(*service.scrape_calls.lock().unwrap(), vec!["https://c.com"]);
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn direct_tier_runs_for_every_url_when_service_yields_nothing() {
    common::init_test_tracing();
    let service = Arc::new(FakeService::default());
    let fetcher = Arc::new(FakeFetcher {
        pages: HashMap::from([
            (
                "https://one.example/a".to_string(),
                article("First Story", "Reactors cool slowly when the pumps stop."),
            ),
            (
                "https://three.example/c".to_string(),
                article("Third Story", "Grid operators balance load every few seconds."),
            ),
        ]),
        ..Default::default()
    });
    let input = urls(&[
        "https://one.example/a",
        "https://two.example/b",
        "https://three.example/c",
    ]);

    let pages = pipeline(service.clone(), fetcher.clone())
        .acquire(&input, 8000)
        .await;

    assert_eq!(service.batch_calls.load(Ordering::SeqCst), 1);
    let mut requested = fetcher.requested.lock().unwrap().clone();
    requested.sort();
    let mut expected = input.clone();
    expected.sort();
    assert_eq!(requested, expected);

    let got: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(got, vec!["https://one.example/a", "https://three.example/c"]);
    assert!(pages[0].text.contains("Reactors cool slowly"));
}

#[tokio::test]
async fn all_tiers_failing_yields_empty_list() {
    common::init_test_tracing();
    let service = Arc::new(FakeService {
        batch: Some(json!({"success": false})),
        ..Default::default()
    });
    let fetcher = Arc::new(FakeFetcher::default());

    let pages = pipeline(service, fetcher.clone())
        .acquire(&urls(&["https://x.com", "https://y.com"]), 8000)
        .await;

    assert!(pages.is_empty());
    assert_eq!(fetcher.requested.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_url_list_makes_no_calls() {
    common::init_test_tracing();
    let service = Arc::new(FakeService::default());
    let fetcher = Arc::new(FakeFetcher::default());

    let pages = pipeline(service.clone(), fetcher.clone()).acquire(&[], 8000).await;

    assert!(pages.is_empty());
    assert_eq!(service.batch_calls.load(Ordering::SeqCst), 0);
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn long_texts_are_truncated_with_marker() {
    common::init_test_tracing();
    let service = Arc::new(FakeService {
        batch: Some(json!([{"url": "https://a.com", "markdown": "héllo wörld"}])),
        ..Default::default()
    });

    let pages = pipeline(service, Arc::new(FakeFetcher::default()))
        .acquire(&urls(&["https://a.com"]), 5)
        .await;

    assert_eq!(pages[0].text, "héllo\u{2026}");
}

#[tokio::test]
async fn textless_row_whose_scrape_is_empty_is_dropped() {
    common::init_test_tracing();
    let service = Arc::new(FakeService {
        batch: Some(json!({"data": [
            {"url": "https://example.com/a", "title": "A", "markdown": "hello world"},
            {"url": "https://example.com/b"}
        ]})),
        scrapes: HashMap::from([("https://example.com/b".to_string(), json!({"data": {}}))]),
        ..Default::default()
    });
    let fetcher = Arc::new(FakeFetcher::default());

    let pages = pipeline(service.clone(), fetcher.clone())
        .acquire(&urls(&["https://example.com/a", "https://example.com/b"]), 8000)
        .await;

    assert_eq!(
        pages,
        vec![CanonicalPage {
            url: "https://example.com/a".into(),
            title: "A".into(),
            text: "hello world".into()
        }]
    );
    assert_eq!(*service.scrape_calls.lock().unwrap(), vec!["https://example.com/b"]);
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

//! Minimal HTTP client with safe logging, explicit timeouts, and bearer auth.
//!
//! - JSON POST for API calls, text GET for raw page downloads
//! - Downloads are decoded with the charset the document declares
//!   (see [`charset`])
//! - Never logs secret values
//! - Optional *raw* request/response logging via `SCRIBE_HTTP_RAW=1`
//!
//! Every call is a single attempt. Callers decide what a failure means for
//! them; the acquisition pipeline, for instance, falls through to its next tier
//! instead of retrying.
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), scribe_http::HttpError> {
//! let client = scribe_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .post_json("v1/items", &serde_json::json!({"q": "rust"}), "token")
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: bearer tokens are sanitized before use, and logs only ever
//! include the auth kind (bearer/none), not the secret.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `SCRIBE_HTTP_RAW=1`.

pub mod charset;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SCRIBE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with the token redacted.
fn make_curl(method: &Method, url: &Url, bearer: bool, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    if bearer {
        parts.push("-H 'authorization: Bearer <redacted>'".to_string());
    }
    if let Some(bytes) = body {
        parts.push("-H 'content-type: application/json'".to_string());
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                s.truncate(floor_char_boundary(&s, RAW_MAX_BODY));
                s.push('\u{2026}');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") {
                val = "Bearer <redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    /// API root that relative paths are joined onto; `None` for clients that
    /// only ever see absolute URLs.
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
}

/// A response whose headers arrived; the body is still unread.
struct Dispatched {
    req_id: String,
    started: Instant,
    response: Response,
}

impl HttpClient {
    /// Construct a client anchored to an API base URL.
    ///
    /// A base without a trailing slash is treated as a directory, so relative
    /// paths are appended rather than replacing its last segment.
    ///
    /// ```no_run
    /// use scribe_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base: Some(base),
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Construct a client for downloading arbitrary pages by absolute URL.
    ///
    /// It identifies itself with `user_agent` and follows up to ten redirects
    /// (reqwest's default policy).
    pub fn for_pages(user_agent: &str) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base: None,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout.
    ///
    /// ```no_run
    /// use scribe_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// POST a JSON body with bearer auth and decode a JSON answer.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: &str,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let sent = self.dispatch(Method::POST, path, Some(body), Some(bearer)).await?;
        read_json(sent).await
    }

    /// GET a document as text, decoded with the charset it declares.
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let sent = self.dispatch::<()>(Method::GET, url, None, None).await?;
        read_text(sent).await
    }

    // ==============================
    // Core request implementation
    // ==============================

    /// Join `path` onto the base; without a base, `path` must be absolute.
    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        let parsed = match &self.base {
            Some(base) => base.join(path),
            None => Url::parse(path),
        };
        parsed.map_err(|e| HttpError::Url(format!("{path:?}: {e}")))
    }

    async fn dispatch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Dispatched, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let timeout = self.default_timeout;
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);

        // body (serialize up front so we can log exact bytes)
        let request_body_bytes = match body {
            Some(b) => {
                let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
                rb = rb
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
                Some(bytes)
            }
            None => None,
        };

        let auth_kind = match bearer {
            Some(tok) => {
                let tok = sanitize_api_key(tok)?;
                rb = rb.bearer_auth(tok);
                "bearer"
            }
            None => "none",
        };

        // ----- Safe request logging (pre-send) -----
        let host_path = host_path(&url);
        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, bearer.is_some(), request_body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let started = Instant::now();
        let response = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(
                req_id=%req_id,
                host_path=%host_path,
                timed_out=err.is_timeout(),
                message=%message,
                "http.network_error.send"
            );
            HttpError::Network(message)
        })?;

        let headers = response.headers();
        tracing::debug!(
            req_id=%req_id,
            status=%response.status(),
            final_url=%response.url(),
            header_ms=started.elapsed().as_millis() as u64,
            x_request_id=%request_id_header(headers),
            content_type=?headers.get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            "http.response.headers"
        );

        Ok(Dispatched {
            req_id,
            started,
            response,
        })
    }
}

// ==============================
// Body readers
// ==============================

/// A fully read response body.
struct ReadBody {
    req_id: String,
    status: StatusCode,
    headers: HeaderMap,
    bytes: Vec<u8>,
}

async fn read_bytes(sent: Dispatched) -> Result<ReadBody, HttpError> {
    let Dispatched {
        req_id,
        started,
        response,
    } = sent;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.bytes().await.map_err(|err| {
        let message = err.to_string();
        tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
        HttpError::Network(message)
    })?;
    log_body(&req_id, status, &headers, started, &bytes);
    Ok(ReadBody {
        req_id,
        status,
        headers,
        bytes: bytes.to_vec(),
    })
}

async fn read_json<T: DeserializeOwned>(sent: Dispatched) -> Result<T, HttpError> {
    let body = read_bytes(sent).await?;
    if !body.status.is_success() {
        return Err(api_error(&body));
    }

    serde_json::from_slice::<T>(&body.bytes).map_err(|e| {
        let snippet = snip_body(&body.bytes);
        tracing::warn!(
            req_id=%body.req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

async fn read_text(sent: Dispatched) -> Result<String, HttpError> {
    let body = read_bytes(sent).await?;
    if !body.status.is_success() {
        return Err(api_error(&body));
    }

    let (text, encoding) = charset::decode_document(&body.headers, &body.bytes);
    tracing::debug!(req_id=%body.req_id, encoding, text_len=text.len(), "http.response.decoded");
    Ok(text)
}

fn log_body(req_id: &str, status: StatusCode, headers: &HeaderMap, started: Instant, bytes: &[u8]) {
    let dur_ms = started.elapsed().as_millis() as u64;
    tracing::debug!(
        req_id=%req_id,
        %status,
        duration_ms=dur_ms,
        body_len=bytes.len(),
        "http.response.body"
    );

    if raw_enabled() {
        let hdrs = redact_headers(headers);
        let truncated = bytes.len() > RAW_MAX_BODY;
        let shown = if truncated { &bytes[..RAW_MAX_BODY] } else { bytes };
        let text = String::from_utf8_lossy(shown);
        tracing::info!(
            target:"http.raw",
            %req_id,
            status=%status,
            duration_ms=dur_ms,
            headers=?hdrs,
            body=%text,
            truncated
        );
    }

    tracing::trace!(
        req_id=%req_id,
        body_snippet=%snip_body(bytes),
        "http.response.body_snippet"
    );
}

fn api_error(body: &ReadBody) -> HttpError {
    let message = extract_error_message_multi(&body.bytes);
    let request_id = request_id_header(&body.headers).to_string();
    tracing::warn!(
        req_id=%body.req_id,
        status=%body.status,
        message=%message,
        x_request_id=%request_id,
        body_snippet=%snip_body(&body.bytes),
        "http.error"
    );
    HttpError::Api {
        status: body.status,
        message,
        request_id,
    }
}

// ==============================
// Helpers
// ==============================

fn request_id_header(headers: &HeaderMap) -> &str {
    headers
        .get("x-request-id")
        .or_else(|| headers.get("x-correlation-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn extract_error_message_multi(body: &[u8]) -> String {
    // OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    // (Firecrawl answers {"success":false,"error":"..."})
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(floor_char_boundary(&snip, 500));
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // 4) Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

/// "host + path" for log lines; the query string is left out.
fn host_path(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or("-"), url.path())
}

use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use scribe_common::{Result, ScribeError};
use scribe_http::{HttpClient, HttpError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
pub struct ResponsesApiRequest {
    model: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesApiResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output: Vec<ResponseMessage>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl ResponsesApiResponse {
    /// Concatenation of every `output_text` part, in order.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|msg| &msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect()
    }
}

impl OpenAiClient {
    /// Create a new client for the given API key and model against the public
    /// endpoint.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(api_key, model, OPENAI_API_BASE, Duration::from_secs(120))
    }

    /// Create a client for an OpenAI-compatible endpoint (gateway, proxy, or a
    /// mock server in tests).
    ///
    /// A blank key is a configuration error rather than something to discover
    /// on the first request.
    pub fn with_endpoint(
        api_key: String,
        model: String,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ScribeError::Config("OpenAI API key missing".into()));
        }
        let client = HttpClient::new(endpoint)
            .map_err(|e| ScribeError::Config(format!("OpenAI endpoint invalid: {e}")))?
            .with_timeout(timeout);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = ResponsesApiRequest {
            model: self.model.clone(),
            input: prompt.to_string(),
            instructions: system_prompt.map(str::to_string),
            max_output_tokens: max_tokens,
            temperature,
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "llm.openai.generate.start"
        );

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", &req, &self.api_key)
            .await
            .map_err(http_to_scribe)?;

        let text = resp.output_text();
        tracing::debug!(
            id = %resp.id,
            status = ?resp.status,
            output_chars = text.chars().count(),
            "llm.openai.generate.done"
        );

        Ok(LlmResponse {
            text,
            model: resp.model.or_else(|| Some(self.model.clone())),
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_scribe(e: HttpError) -> ScribeError {
    ScribeError::Transport(format!("{e}"))
}

mod common;
use scribe_common::{Result, ScribeError};
use scribe_llm::openai::OpenAiClient;
use scribe_llm::traits::LlmClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gpt-4.1-mini";

fn mock_client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::with_endpoint(
        "sk-test".to_string(),
        MODEL.to_string(),
        &format!("{}/v1", server.uri()),
        Duration::from_secs(5),
    )
    .expect("client builds")
}

#[tokio::test]
async fn generate_concatenates_output_text_parts() -> Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": MODEL, "input": "Write a report"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "status": "completed",
            "model": MODEL,
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "## Overview\n"},
                    {"type": "output_text", "text": "Findings [1]."}
                ]}
            ],
            "usage": {"total_tokens": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = mock_client(&server)
        .generate("Write a report", None, None, None)
        .await?;

    assert_eq!(reply.text, "## Overview\nFindings [1].");
    assert_eq!(reply.model.as_deref(), Some(MODEL));
    assert_eq!(reply.tokens_used, Some(42));
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_as_transport_errors() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"message": "upstream exploded"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .generate("Write a report", None, None, None)
        .await
        .unwrap_err();

    match err {
        ScribeError::Transport(msg) => assert!(msg.contains("upstream exploded")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn blank_key_is_a_configuration_error() {
    let err = OpenAiClient::new("  ".to_string(), MODEL.to_string()).err();
    assert!(matches!(err, Some(ScribeError::Config(_))));
}

#[tokio::test]
#[ignore]
async fn openai_generate_smoketest() -> Result<()> {
    common::init_test_tracing();
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        tracing::debug!("Skipping: OPENAI_API_KEY not set");
        return Ok(());
    };
    let client = OpenAiClient::new(key, MODEL.to_string())?;

    let response = client.generate("Say Ok", None, Some(16), None).await?;
    tracing::debug!("OpenAi response is: {}", response.text);

    assert!(
        !response.text.trim().is_empty(),
        "response text should not be empty"
    );
    Ok(())
}

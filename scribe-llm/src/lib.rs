//! Completion-endpoint integration for Scribe.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and the OpenAI
//! Responses API implementation used for report synthesis. Callers hold the
//! client as `Arc<dyn LlmClient>` so tests can substitute a scripted model.
//!
//! # Examples
//! ```no_run
//! use scribe_llm::openai::OpenAiClient;
//! use scribe_llm::traits::LlmClient;
//!
//! # #[tokio::main]
//! # async fn main() -> scribe_common::Result<()> {
//! let client = OpenAiClient::new("sk-...".into(), scribe_llm::DEFAULT_OPENAI_MODEL.into())?;
//! let reply = client.generate("Say OK", None, Some(8), None).await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```
pub mod openai;
pub mod traits;

/// Model used for synthesis when configuration does not name one.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

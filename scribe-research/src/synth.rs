//! Corpus assembly and the single synthesis call.
use scribe_common::{CanonicalPage, Result};
use scribe_llm::traits::LlmClient;
use std::sync::Arc;
use std::time::Instant;

/// Corpus text used when no page made it through.
pub const EMPTY_CORPUS: &str = "No pages scraped.";

/// Number the usable pages from 1 and render one block per page.
///
/// Pages with an empty url or text are left out and do not consume a number.
pub fn build_corpus(pages: &[CanonicalPage]) -> String {
    let blocks: Vec<String> = pages
        .iter()
        .filter(|p| !p.url.is_empty() && !p.text.is_empty())
        .enumerate()
        .map(|(i, p)| format!("[{}] {} \u{2014} {}\n{}\n", i + 1, p.title, p.url, p.text))
        .collect();

    if blocks.is_empty() {
        EMPTY_CORPUS.to_string()
    } else {
        blocks.join("\n")
    }
}

/// The synthesis instructions wrapped around `topic` and `corpus`.
pub fn build_prompt(topic: &str, corpus: &str) -> String {
    format!(
        "You are an expert research writer.\n\
         \n\
         TOPIC:\n\
         {topic}\n\
         \n\
         CORPUS (numbered sources follow the format \"[n] title \u{2014} url\"):\n\
         {corpus}\n\
         \n\
         TASK:\n\
         1) Produce a clear, well-structured research report on the topic.\n\
         2) Include: overview, key findings, important concepts, examples/case studies, \
         current trends, risks/limitations, and a short future outlook.\n\
         3) Use inline citations like [1], [2] that refer to the numbered sources above.\n\
         4) End with a \"References\" section listing the source number, title (or domain), and URL.\n\
         \n\
         Keep it factual, concise, and readable. If any claims are speculative, mark them as such.\n"
    )
}

/// Turns acquired pages into report Markdown with one completion call.
#[derive(Clone)]
pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Returns the model's text verbatim. Failures propagate; nothing is retried.
    pub async fn synthesize(&self, topic: &str, pages: &[CanonicalPage]) -> Result<String> {
        let corpus = build_corpus(pages);
        let prompt = build_prompt(topic, &corpus);
        let started = Instant::now();

        tracing::info!(
            target: "scribe.synth",
            model = self.llm.model_name(),
            pages = pages.len(),
            prompt_chars = prompt.chars().count(),
            "scribe.synth.start"
        );

        let reply = self.llm.generate(&prompt, None, None, None).await.inspect_err(|e| {
            tracing::error!(target: "scribe.synth", error = %e, "scribe.synth.error");
        })?;

        tracing::info!(
            target: "scribe.synth",
            model = reply.model.as_deref().unwrap_or(self.llm.model_name()),
            tokens_used = ?reply.tokens_used,
            output_chars = reply.text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scribe.synth.done"
        );
        Ok(reply.text)
    }
}

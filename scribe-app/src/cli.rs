use clap::Parser;
use std::path::PathBuf;

/// Write a citation-annotated research report from a handful of web pages.
#[derive(Parser, Debug)]
#[command(name = "scribe", version, about)]
pub struct Cli {
    /// What the report should be about.
    #[arg(long)]
    pub topic: String,

    /// Source URLs separated by commas, spaces or newlines. Defaults apply when omitted.
    #[arg(long, default_value = "")]
    pub urls: String,

    /// Maximum number of URLs to read (config `research.max_urls` when omitted).
    #[arg(long)]
    pub max_urls: Option<usize>,

    /// Characters kept per page (config `research.per_page_limit` when omitted).
    #[arg(long)]
    pub per_page_limit: Option<usize>,

    /// Configuration file; `./scribe.yaml` is read if present when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to write the report (defaults to `<topic>.md`).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print the report instead of writing a file.
    #[arg(long)]
    pub stdout: bool,
}

impl Cli {
    pub fn output_path(&self, topic: &str) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.md", sanitize_filename(topic))))
    }
}

/// Keep letters, digits and `-_.`; everything else becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}

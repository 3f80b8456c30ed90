//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every section is optional),
//! 2. YAML files / inline snippets attached to the loader, in order,
//! 3. `SCRIBE__`-prefixed environment variables, with `__` separating path
//!    segments (`SCRIBE__OPENAI__MODEL=gpt-4.1`).
//!
//! After merging, every string is run through `${VAR}` expansion. API keys left
//! blank or still holding an unresolved `${...}` placeholder fall back to the
//! conventional `FIRECRAWL_API_KEY` / `OPENAI_API_KEY` variables, and are `None`
//! when those are unset too. Credentials are resolved here, once, and handed to
//! the adapters that need them.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const FIRECRAWL_KEY_ENV: &str = "FIRECRAWL_API_KEY";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Sources consulted when a report request carries no URLs.
pub const DEFAULT_SOURCE_URLS: &[&str] = &[
    "https://openai.com/blog",
    "https://huggingface.co/blog",
    "https://ai.googleblog.com/",
    "https://www.deeplearning.ai/the-batch/",
    "https://arxiv.org/list/cs.AI/recent",
    "https://www.anthropic.com/news",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScribeConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub firecrawl: FirecrawlConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote extraction/scrape service.
#[derive(Debug, Clone, Deserialize)]
pub struct FirecrawlConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_firecrawl_endpoint")]
    pub base_url: String,
    #[serde(default = "default_firecrawl_timeout")]
    pub timeout_secs: u64,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_firecrawl_endpoint(),
            timeout_secs: default_firecrawl_timeout(),
        }
    }
}

/// Completion endpoint used for report synthesis.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            endpoint: default_openai_endpoint(),
            timeout_secs: default_openai_timeout(),
        }
    }
}

/// Request defaults and direct-fetch tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
    #[serde(default = "default_per_page_limit")]
    pub per_page_limit: usize,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_source_urls")]
    pub default_urls: Vec<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_urls: default_max_urls(),
            per_page_limit: default_per_page_limit(),
            fetch_concurrency: default_fetch_concurrency(),
            fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            default_urls: default_source_urls(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: default_log_format(),
            stderr: false,
            filter: default_log_filter(),
        }
    }
}

fn default_firecrawl_endpoint() -> String {
    "https://api.firecrawl.dev".into()
}
fn default_firecrawl_timeout() -> u64 {
    60
}
fn default_openai_model() -> String {
    "gpt-4.1-mini".into()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_openai_timeout() -> u64 {
    120
}
fn default_max_urls() -> usize {
    8
}
fn default_per_page_limit() -> usize {
    8000
}
fn default_fetch_concurrency() -> usize {
    4
}
fn default_fetch_timeout() -> u64 {
    20
}
fn default_user_agent() -> String {
    concat!("scribe/", env!("CARGO_PKG_VERSION")).into()
}
fn default_source_urls() -> Vec<String> {
    DEFAULT_SOURCE_URLS.iter().map(|s| s.to_string()).collect()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// A key is usable when it is non-blank and fully expanded.
fn usable_secret(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.contains("${"))
}

fn resolve_credential(configured: Option<String>, env_name: &str) -> Option<String> {
    usable_secret(configured).or_else(|| usable_secret(std::env::var(env_name).ok()))
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ScribeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ScribeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScribeConfigLoader {
    /// Start with defaults plus `SCRIBE__` env overrides.
    ///
    /// ```
    /// use scribe_config::ScribeConfigLoader;
    ///
    /// let config = ScribeConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.research.max_urls, 8);
    /// assert_eq!(config.openai.model, "gpt-4.1-mini");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the `config` crate infers
    /// format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent, so deployments can rely on
    /// environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use scribe_config::ScribeConfigLoader;
    ///
    /// let cfg = ScribeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// research:
    ///   max_urls: 3
    ///   default_urls: ["https://example.com/a", "https://example.com/b"]
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.research.max_urls, 3);
    /// assert_eq!(cfg.research.default_urls.len(), 2);
    /// assert_eq!(cfg.research.per_page_limit, 8000);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config, expanding `${VAR}` placeholders and resolving credentials.
    ///
    /// ```
    /// use scribe_config::ScribeConfigLoader;
    ///
    /// unsafe { std::env::set_var("SCRIBE_DOC_FC_KEY", "fc-from-env"); }
    ///
    /// let config = ScribeConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// firecrawl:
    ///   api_key: "${SCRIBE_DOC_FC_KEY}"
    /// openai:
    ///   model: "gpt-4o"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.firecrawl.api_key.as_deref(), Some("fc-from-env"));
    /// assert_eq!(config.firecrawl.base_url, "https://api.firecrawl.dev");
    /// assert_eq!(config.openai.model, "gpt-4o");
    /// assert_eq!(config.openai.endpoint, "https://api.openai.com/v1");
    ///
    /// unsafe { std::env::remove_var("SCRIBE_DOC_FC_KEY"); }
    /// ```
    pub fn load(self) -> Result<ScribeConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SCRIBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: ScribeConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        typed.firecrawl.api_key = resolve_credential(typed.firecrawl.api_key.take(), FIRECRAWL_KEY_ENV);
        typed.openai.api_key = resolve_credential(typed.openai.api_key.take(), OPENAI_KEY_ENV);

        Ok(typed)
    }
}

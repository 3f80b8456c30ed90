use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use scribe_common::ScribeError;
use scribe_common::observability::{LogConfig, LogFormat, init_logging};
use scribe_config::{LoggingConfig, ScribeConfig, ScribeConfigLoader};
use scribe_research::{ReportOutcome, ReportRequest, ReportService};
use std::process::ExitCode;
mod cli;

const DEFAULT_CONFIG_FILE: &str = "scribe.yaml";

/// Exit status for requests that ran but produced no report.
const EXIT_NO_REPORT: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) .env, then config (env wins)
    dotenvy::dotenv().ok();
    let loader = match &cli.config {
        Some(path) => ScribeConfigLoader::new().with_file(path),
        None => ScribeConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: ScribeConfig = loader.load().context("loading configuration")?;

    // 2) logging
    let log_path = init_logging(log_config(&cfg.logging)?)?;
    tracing::info!(log = %log_path.display(), version = ?cfg.version, "scribe.start");

    // 3) request
    let request = match ReportRequest::new(
        &cli.topic,
        &cli.urls,
        Some(cli.max_urls.unwrap_or(cfg.research.max_urls)),
        Some(cli.per_page_limit.unwrap_or(cfg.research.per_page_limit)),
    ) {
        Ok(r) => r,
        Err(ScribeError::InvalidRequest(message)) => {
            eprintln!("{message}");
            return Ok(ExitCode::from(EXIT_NO_REPORT));
        }
        Err(e) => return Err(e.into()),
    };

    // 4) run
    let service = ReportService::from_config(&cfg)?;
    let report = match service.run(&request).await? {
        ReportOutcome::Report(report) => report,
        ReportOutcome::NoContent { message } => {
            eprintln!("{message}");
            return Ok(ExitCode::from(EXIT_NO_REPORT));
        }
    };

    // 5) output
    if cli.stdout {
        println!("{}", report.markdown);
    } else {
        let path = cli.output_path(&report.topic);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&path, &report.markdown)
            .with_context(|| format!("writing report to {}", path.display()))?;
        tracing::info!(path = %path.display(), sources = report.sources.len(), "scribe.report.written");
        println!("{}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn log_config(logging: &LoggingConfig) -> Result<LogConfig> {
    let format: LogFormat = logging.format.parse().map_err(anyhow::Error::msg)?;
    Ok(LogConfig {
        app_name: "scribe",
        log_dir: logging.dir.clone(),
        emit_stderr: logging.stderr,
        format,
        default_filter: logging.filter.clone(),
    })
}

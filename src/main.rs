use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;

use reportscan::domain::{DocumentBuffer, ExtractionMethod};
use reportscan::infrastructure::observability::{TracingConfig, init_tracing};
use reportscan::infrastructure::text_processing::ExtractorFactory;
use reportscan::presentation::config::{Environment, Settings, SettingsError};

/// Extract text from a scanned inspection report (PDF, JPEG, or PNG).
#[derive(Debug, Parser)]
#[command(name = "reportscan", version)]
struct Cli {
    /// Document to extract.
    file: PathBuf,

    /// Preferred strategy: ocr, vision, or hybrid.
    #[arg(long)]
    method: Option<ExtractionMethod>,

    /// Disable the vision-only fallback.
    #[arg(long)]
    no_fallback: bool,

    /// Per-attempt deadline for external calls, in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Directory holding `appsettings.{Environment}` files.
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let environment = Environment::from_env().map_err(SettingsError::Environment)?;
    let settings = Settings::load(&cli.config_dir, environment)?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));

    let pipeline = ExtractorFactory::create_pipeline(&settings.extraction)
        .context("failed to configure extractors")?;

    let data = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let filename = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut buffer = DocumentBuffer::new(data, filename);
    if let Some(modified) = tokio::fs::metadata(&cli.file)
        .await
        .ok()
        .and_then(|m| m.modified().ok())
    {
        buffer = buffer.with_last_modified(DateTime::<Utc>::from(modified));
    }

    let mut options = settings.extraction.process_options();
    if let Some(method) = cli.method {
        options.preferred_method = method;
    }
    if cli.no_fallback {
        options.fallback_enabled = false;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        options.timeout = Duration::from_millis(timeout_ms);
    }

    let result = pipeline.process(&buffer, options).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

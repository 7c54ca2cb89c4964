//! Command handlers -- one module per subcommand

pub mod config;
pub mod parse;
pub mod process;

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use logrebase_core::config::RebaseConfig;
use logrebase_core::types::LogFormat;
use logrebase_pipeline::{BatchPipeline, BatchPipelineBuilder, MalformedLine, ParsedBatch, PipelineConfig};

use crate::cli::Commands;
use crate::error::CliError;
use crate::output::OutputWriter;
use crate::source::LineSource;

/// Reports list at most this many malformed lines / ambiguous dates.
pub const MAX_SAMPLES: usize = 10;

/// Dispatch a parsed subcommand.
pub async fn execute(
    command: Commands,
    config_path: &Path,
    config: RebaseConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Parse(args) => parse::execute(args, config, writer).await,
        Commands::Process(args) => process::execute(args, config, writer).await,
        Commands::Config(args) => config::execute(args, config_path, writer).await,
    }
}

/// Load the effective configuration.
///
/// A missing file is not an error: defaults plus env overrides apply.
pub async fn load_config(path: &Path) -> Result<RebaseConfig, CliError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(RebaseConfig::load(path).await?);
    }
    debug!(path = %path.display(), "config file not found, using defaults");
    let mut config = RebaseConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Build a pipeline from config; CLI flags override the `[batch]` section.
pub fn build_pipeline(
    config: &RebaseConfig,
    format: LogFormat,
    year: Option<i32>,
    now: Option<NaiveDateTime>,
) -> Result<BatchPipeline, CliError> {
    let mut batch = config.batch.clone();
    batch.start_year = year.or(batch.start_year);
    batch.now = now.or(batch.now);

    let pipeline = BatchPipelineBuilder::new()
        .config(PipelineConfig::from_core(&batch, format))
        .build()?;
    Ok(pipeline)
}

/// Pass 1 over an input file.
pub fn ingest_file(pipeline: &BatchPipeline, input: &Path) -> Result<ParsedBatch, CliError> {
    let source = LineSource::open(input)?;
    info!(
        path = %input.display(),
        format = %pipeline.format(),
        start_year = pipeline.config().start_year,
        "reading input"
    );
    let mut ingestor = pipeline.ingestor();
    for line in source {
        ingestor.push(&line?);
    }
    Ok(ingestor.finish())
}

/// Run blocking file work off the async runtime.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, CliError>
where
    F: FnOnce() -> Result<T, CliError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CliError::Command(format!("batch worker failed: {e}")))?
}

/// A malformed line as shown in reports.
#[derive(Debug, Clone, Serialize)]
pub struct MalformedEntry {
    pub seq: usize,
    pub reason: String,
}

pub(crate) fn malformed_samples(malformed: &[MalformedLine]) -> Vec<MalformedEntry> {
    malformed
        .iter()
        .take(MAX_SAMPLES)
        .map(|line| MalformedEntry {
            seq: line.seq,
            reason: line.error.to_string(),
        })
        .collect()
}

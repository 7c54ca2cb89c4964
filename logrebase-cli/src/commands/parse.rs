//! `logrebase parse` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logrebase_core::config::RebaseConfig;
use logrebase_core::types::LogFormat;
use logrebase_pipeline::IngestStats;

use super::{MalformedEntry, build_pipeline, ingest_file, malformed_samples, run_blocking};
use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::sink::JsonlSink;

/// Execute the `parse` command.
///
/// Writes unshifted records in line order. A file without any parseable
/// line is an empty batch and no output file is created.
pub async fn execute(
    args: ParseArgs,
    config: RebaseConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run_blocking(move || parse_file(&args, &config)).await?;
    writer.render(&report)
}

/// Blocking body of the `parse` command.
pub fn parse_file(args: &ParseArgs, config: &RebaseConfig) -> Result<ParseReport, CliError> {
    let pipeline = build_pipeline(config, args.format, args.year, None)?;
    let batch = ingest_file(&pipeline, &args.input)?;

    if batch.records.is_empty() {
        return Err(CliError::EmptyBatch {
            format: batch.format,
            malformed: batch.stats.malformed,
        });
    }

    let mut sink = JsonlSink::create(&args.output, config.output.pretty_json)?;
    let written = sink.write_all(batch.records.iter())?;
    info!(
        output = %args.output.display(),
        written,
        malformed = batch.stats.malformed,
        "parsed records written"
    );

    Ok(ParseReport {
        format: batch.format,
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        stats: batch.stats,
        final_year: batch.final_year,
        written,
        malformed: malformed_samples(&batch.malformed),
    })
}

/// Summary of a `parse` run.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub format: LogFormat,
    pub input: String,
    pub output: String,
    pub stats: IngestStats,
    /// Year the rollover tracker ended on
    pub final_year: i32,
    pub written: usize,
    /// First malformed lines (capped)
    pub malformed: Vec<MalformedEntry>,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Parsed {} log: {} -> {}",
            self.format.as_str().bold(),
            self.input,
            self.output
        )?;
        writeln!(w, "  Lines:     {} ({} blank)", self.stats.lines, self.stats.blank)?;
        writeln!(w, "  Records:   {}", self.written.to_string().green())?;
        render_malformed(w, self.stats.malformed, &self.malformed)?;
        if !self.format.has_explicit_year() {
            writeln!(
                w,
                "  Rollovers: {} (final year {})",
                self.stats.rollovers, self.final_year
            )?;
        }
        Ok(())
    }
}

pub(crate) fn render_malformed(
    w: &mut dyn Write,
    total: usize,
    samples: &[MalformedEntry],
) -> std::io::Result<()> {
    use colored::Colorize;

    if total == 0 {
        writeln!(w, "  Malformed: 0")?;
        return Ok(());
    }
    writeln!(w, "  Malformed: {}", total.to_string().yellow())?;
    for entry in samples {
        writeln!(w, "    line {}: {}", entry.seq + 1, entry.reason.yellow())?;
    }
    if total > samples.len() {
        writeln!(w, "    ... {} more", total - samples.len())?;
    }
    Ok(())
}

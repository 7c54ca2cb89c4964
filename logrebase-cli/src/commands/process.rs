//! `logrebase process` command handler

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use logrebase_core::config::RebaseConfig;
use logrebase_core::types::LogFormat;
use logrebase_pipeline::{IngestStats, RecordAmbiguity, ShiftDelta};

use super::parse::render_malformed;
use super::{
    MAX_SAMPLES, MalformedEntry, build_pipeline, ingest_file, malformed_samples, run_blocking,
};
use crate::cli::ProcessArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::sink::JsonlSink;

/// Execute the `process` command.
pub async fn execute(
    args: ProcessArgs,
    config: RebaseConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run_blocking(move || process_file(&args, &config)).await?;
    writer.render(&report)
}

/// Blocking body of the `process` command: both passes, then the JSONL write.
pub fn process_file(args: &ProcessArgs, config: &RebaseConfig) -> Result<ProcessReport, CliError> {
    let pipeline = build_pipeline(config, args.format, args.year, args.now)?;
    let now = pipeline.reference_now();

    let parsed = ingest_file(&pipeline, &args.input)?;
    let batch = pipeline.normalize(parsed, now)?;

    if !batch.rewrite.ambiguous.is_empty() {
        warn!(
            count = batch.rewrite.ambiguous.len(),
            "some embedded dates were left unshifted"
        );
    }

    let mut sink = JsonlSink::create(&args.output, config.output.pretty_json)?;
    let written = sink.write_all(batch.records.iter())?;
    info!(
        output = %args.output.display(),
        written,
        delta_seconds = batch.delta().num_seconds(),
        "normalized records written"
    );

    Ok(ProcessReport {
        format: batch.format,
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        stats: batch.stats,
        final_year: batch.final_year,
        shift: batch.shift,
        written,
        rewritten: batch.rewrite.rewritten,
        ambiguous_total: batch.rewrite.ambiguous.len(),
        ambiguous: batch
            .rewrite
            .ambiguous
            .into_iter()
            .take(MAX_SAMPLES)
            .collect(),
        malformed: malformed_samples(&batch.malformed),
    })
}

/// Summary of a `process` run.
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    pub format: LogFormat,
    pub input: String,
    pub output: String,
    pub stats: IngestStats,
    pub final_year: i32,
    pub shift: ShiftDelta,
    pub written: usize,
    /// Embedded date spans rewritten across all records
    pub rewritten: usize,
    pub ambiguous_total: usize,
    /// First ambiguous spans (capped)
    pub ambiguous: Vec<RecordAmbiguity>,
    pub malformed: Vec<MalformedEntry>,
}

impl Render for ProcessReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Processed {} log: {} -> {}",
            self.format.as_str().bold(),
            self.input,
            self.output
        )?;
        writeln!(w, "  Lines:     {} ({} blank)", self.stats.lines, self.stats.blank)?;
        writeln!(w, "  Records:   {}", self.written.to_string().green())?;
        render_malformed(w, self.stats.malformed, &self.malformed)?;
        writeln!(w, "  Newest:    {} -> {}", self.shift.max, self.shift.now)?;
        writeln!(w, "  Delta:     {}s", self.shift.delta.num_seconds())?;
        writeln!(w, "  Rewritten: {} embedded dates", self.rewritten)?;

        if self.ambiguous_total > 0 {
            writeln!(
                w,
                "  Unshifted: {}",
                self.ambiguous_total.to_string().yellow()
            )?;
            for entry in &self.ambiguous {
                writeln!(
                    w,
                    "    line {} {} '{}': {}",
                    entry.seq + 1,
                    entry.date.field,
                    entry.date.text,
                    entry.date.reason.to_string().yellow()
                )?;
            }
        }
        Ok(())
    }
}

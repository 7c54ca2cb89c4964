//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here. Value parsers only validate
//! the shape of `FORMAT` and `--now`.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};

use logrebase_core::types::LogFormat;

/// logrebase -- parse historical log batches and rebase their timestamps.
///
/// Use `logrebase <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logrebase", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logrebase.toml configuration file (defaults apply when missing).
    #[arg(short, long, global = true, default_value = "logrebase.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Report format.
    #[arg(long = "output", id = "output_format", value_name = "OUTPUT", global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a log file into JSONL records without shifting timestamps.
    Parse(ParseArgs),

    /// Parse a log file, rebase every timestamp onto `now` and write JSONL.
    Process(ProcessArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- parse ----

/// Pass 1 only: grammar parse, year inference and enrichment.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Log format (apache, hadoop, linux, openssh).
    #[arg(value_parser = parse_format)]
    pub format: LogFormat,

    /// Input log file (`.gz` is decompressed).
    pub input: PathBuf,

    /// Output JSONL file (`.gz` is compressed).
    pub output: PathBuf,

    /// Starting year for formats without a year in the line.
    #[arg(long)]
    pub year: Option<i32>,
}

// ---- process ----

/// Full two-pass run: parse, compute the batch delta, shift and rewrite.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Log format (apache, hadoop, linux, openssh).
    #[arg(value_parser = parse_format)]
    pub format: LogFormat,

    /// Input log file (`.gz` is decompressed).
    pub input: PathBuf,

    /// Output JSONL file (`.gz` is compressed).
    pub output: PathBuf,

    /// Starting year for formats without a year in the line.
    #[arg(long)]
    pub year: Option<i32>,

    /// Reference moment the newest record is moved to (e.g. 2030-01-01T00:00:00).
    /// Defaults to `[batch] now` from the config, then the local clock.
    #[arg(long, value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,
}

// ---- config ----

/// Manage logrebase configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, batch, output).
        #[arg(long)]
        section: Option<String>,
    },
}

fn parse_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::from_str_loose(s).ok_or_else(|| {
        let names: Vec<&str> = LogFormat::ALL.iter().map(LogFormat::as_str).collect();
        format!("unknown format '{s}' (expected: {})", names.join(", "))
    })
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| format!("invalid timestamp '{s}': {e} (expected YYYY-MM-DDTHH:MM:SS)"))
}

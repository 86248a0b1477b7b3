//! CLI argument definitions for the drift-review tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use rmdrift_model::ValueColumn;

#[derive(Parser)]
#[command(
    name = "rmdrift",
    version,
    about = "Reference-material drift check and correction for lab exports",
    long_about = "Pivot repeated element readings into per-occurrence rows, classify the\n\
                  reference-material points embedded in the run, and correct instrument\n\
                  drift on the samples measured between them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check reference-material drift in an export.
    Check(CheckArgs),

    /// Apply drift corrections and write the corrected table.
    Correct(CorrectArgs),

    /// List the pivot element columns of an export.
    Elements(ElementsArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the instrument export CSV.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Reference-material label keyword.
    #[arg(long = "keyword", default_value = "RM")]
    pub keyword: String,

    /// Numeric column feeding the pivot.
    #[arg(long = "value-column", value_enum, default_value = "corr-con")]
    pub value_column: ValueColumnArg,

    /// Write the pivot and reference tables as CSV into this directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CorrectArgs {
    /// Path to the instrument export CSV.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Element column(s) to correct; repeat the flag for several, omit
    /// for every pivot column.
    #[arg(long = "element", value_name = "ELEMENT")]
    pub elements: Vec<String>,

    /// Anchor reference sequence number (default: the lowest classified).
    #[arg(long = "ref-number", value_name = "N")]
    pub ref_number: Option<u32>,

    /// Ramp each correction linearly across the affected rows instead of
    /// applying the full ratio uniformly.
    #[arg(long = "stepwise")]
    pub stepwise: bool,

    /// Reference-material label keyword.
    #[arg(long = "keyword", default_value = "RM")]
    pub keyword: String,

    /// Numeric column feeding the pivot.
    #[arg(long = "value-column", value_enum, default_value = "corr-con")]
    pub value_column: ValueColumnArg,

    /// Directory for the corrected table (default: alongside the input).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the drift report as JSON to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ElementsArgs {
    /// Path to the instrument export CSV.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Numeric column feeding the pivot.
    #[arg(long = "value-column", value_enum, default_value = "corr-con")]
    pub value_column: ValueColumnArg,
}

/// CLI value-column choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ValueColumnArg {
    /// Corrected concentration (`Corr Con`).
    CorrCon,
    /// Raw intensity (`Int`).
    Int,
}

impl From<ValueColumnArg> for ValueColumn {
    fn from(arg: ValueColumnArg) -> Self {
        match arg {
            ValueColumnArg::CorrCon => ValueColumn::CorrCon,
            ValueColumnArg::Int => ValueColumn::Intensity,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

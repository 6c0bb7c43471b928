//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "clinreg",
    version,
    about = "Curate and validate clinical registry extracts",
    long_about = "Curate a directory of registry extracts into canonical, schema-conformant\n\
                  tables with cohort-prefixed participant identifiers, and validate that\n\
                  curated identifiers agree with the subject registry."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q to quiet down).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
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

    /// Allow subject identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Entity catalog to use instead of the built-in one.
    ///
    /// Falls back to the CLINREG_CATALOG environment variable, then to the
    /// catalog compiled into the binary.
    #[arg(long = "catalog", value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Move, rename and curate the extracts in a source directory.
    Curate(CurateArgs),

    /// Check curated identifiers against the subject registry.
    Validate(ValidateArgs),

    /// List the entities of the catalog.
    Entities,
}

#[derive(Parser)]
pub struct CurateArgs {
    /// Directory holding the extracts under their legacy names.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Destination for curated tables (default: <SOURCE_DIR>/Clinical).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write the curation report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Directory holding the curated tables.
    #[arg(value_name = "CLINICAL_DIR")]
    pub clinical_dir: PathBuf,

    /// Also write the validation report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "medx",
    version,
    about = "Filter clinical visit extracts by patient code coverage",
    long_about = "Filter clinical visit extracts exported as CSV.\n\n\
                  A TOML configuration selects the columns, the data quality rules and \
                  one filter strategy: specific code, abdominal perimeter, clinical \
                  assessment, clinical assessment with risk factors, or the generic \
                  code/lab filter."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

    /// Allow patient identifiers in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter an extract and write the result.
    Run(RunArgs),

    /// Validate a configuration and show the strategy it selects.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Configuration file.
    #[arg(long, short = 'c', value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Input CSV (overrides configuracion.archivo_entrada).
    #[arg(long, short = 'i', value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Output CSV (overrides configuracion.archivo_salida).
    #[arg(long, short = 'o', value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Filter and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Configuration file.
    #[arg(long, short = 'c', value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
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

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// EdgeSight - visual inspection delivery-and-audit pipeline
#[derive(Parser, Debug)]
#[command(
    name = "edgesight",
    author,
    version,
    about = "EdgeSight inspection line delivery pipeline",
    long_about = "Edge visual-inspection delivery pipeline.\n\n\
                  Captures frames through a bounded reliability buffer, routes \n\
                  detection results to operational sinks, maintains a signed \n\
                  audit trail, and feeds live dashboard subscribers."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EDGESIGHT_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EDGESIGHT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the delivery pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Verify and summarize a governance log date range
    Report(ReportArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "EDGESIGHT_CONFIG")]
    pub config: PathBuf,

    /// Run the full results path in-process with a synthetic source and
    /// stub detector (no external transform/detector services needed)
    #[arg(long, env = "EDGESIGHT_DEMO")]
    pub demo: bool,

    /// Maximum number of results to process in demo mode (0 = unlimited)
    #[arg(long, default_value = "0", env = "EDGESIGHT_MAX_RESULTS")]
    pub max_results: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "EDGESIGHT_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "EDGESIGHT_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Arguments for the `report` command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Path to configuration file (for the governance base dir)
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long = "from")]
    pub date_from: String,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long = "to")]
    pub date_to: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

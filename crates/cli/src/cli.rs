//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sawmill - leveled log dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "sawmill",
    author,
    version,
    about = "Leveled log dispatcher",
    long_about = "Loads a logging configuration, checks it, and pipes lines from stdin \n\
                  through the configured destinations."
)]
pub struct Cli {
    /// Increase diagnostic verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SAWMILL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "SAWMILL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read stdin and log every line through the configured destinations
    Pipe(PipeArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `pipe` command
#[derive(Parser, Debug, Clone)]
pub struct PipeArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "logging.toml",
        env = "SAWMILL_CONFIG"
    )]
    pub config: PathBuf,

    /// Record queue size; lines beyond it are dropped while destinations catch up
    #[arg(long, default_value = "300", env = "SAWMILL_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Host name stamped on records (detected when omitted)
    #[arg(long, env = "SAWMILL_HOSTNAME")]
    pub hostname: Option<String>,

    /// Prometheus metrics port (disabled when omitted)
    #[arg(long, env = "SAWMILL_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Print the dispatch summary to stderr when done
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "logging.toml", env = "SAWMILL_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "logging.toml", env = "SAWMILL_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show granular overrides and destination properties
    #[arg(long)]
    pub details: bool,
}

/// Diagnostic output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

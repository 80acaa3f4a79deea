//! CLI parse: clap types for orgtrack. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Orgtrack CLI - staged progress for long-running org operations
#[derive(Parser)]
#[command(name = "orgtrack")]
#[command(about = "Track long-running org operations as an ordered pipeline of stages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay a TOML script of tracker steps and print the final stage table
    Replay {
        /// Path to the replay script
        script: PathBuf,
        /// Output format (text, table or json); defaults to the configured format
        #[arg(long)]
        format: Option<String>,
        /// Print a frame after every step
        #[arg(long)]
        frames: bool,
        /// Append telemetry events to this JSONL file
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Track a sandbox copy from a recorded JSON feed of status reports
    Sandbox {
        /// Path to a JSON array of sandbox progress reports
        feed: PathBuf,
        /// Delay between status checks in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Give up after this many seconds (overrides config)
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Wait for this login URL or host to resolve before authenticating
        #[arg(long)]
        login_url: Option<String>,
        /// Output format (text, table or json); defaults to the configured format
        #[arg(long)]
        format: Option<String>,
        /// Append telemetry events to this JSONL file
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Print a number of seconds as a human-readable duration
    Duration {
        /// Number of seconds
        seconds: u64,
    },
}

//! CLI argument parsing for rtstats

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for utilization reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "rtstats")]
#[command(version)]
#[command(about = "Per-task CPU share between two snapshots of the task table", long_about = None)]
pub struct Cli {
    /// Measure only the threads of this process (default: every thread on the host)
    #[arg(short = 'p', long = "pid", value_name = "PID")]
    pub pid: Option<i32>,

    /// Ticks to wait between the two snapshots
    #[arg(short = 't', long = "ticks", value_name = "TICKS", default_value = "100")]
    pub ticks: u32,

    /// Length of one tick in milliseconds [default: 10, or from --config]
    #[arg(long = "tick-ms", value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Number of processors sharing the clock [default: detected]
    #[arg(long = "cpus", value_name = "N")]
    pub cpus: Option<u32>,

    /// Extra snapshot buffer slots beyond the current task count [default: 5]
    #[arg(long = "slack", value_name = "N")]
    pub slack: Option<usize>,

    /// Number of estimates to run (0 = until interrupted)
    #[arg(short = 'n', long = "iterations", value_name = "N", default_value = "1")]
    pub iterations: u64,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only show tasks whose name matches this regular expression
    #[arg(short = 'e', long = "filter", value_name = "REGEX")]
    pub filter: Option<String>,

    /// Load estimator settings from a TOML file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

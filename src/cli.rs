//! CLI arguments for svcps.
//!
//! This module defines the command-line interface structure using the clap
//! library, including all flags, options, and value enums.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Table aggregation rules
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AggregateArg {
    /// Reduce the table to the single row with the smallest uptime
    MinUptime,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "svcps",
    about = "Print an aligned process table for systemd services",
    long_about = "Print an aligned process table for systemd services.\n\n\
                  Resolves each service's member PIDs through the cgroup tree, reads \
                  /proc/<pid>/stat and cmdline, and prints the requested columns as an \
                  aligned table.",
    version
)]
pub struct Args {
    /// systemd service name (repeatable)
    #[arg(short = 's', long = "service")]
    pub service: Vec<String>,

    /// Hide the header row
    #[arg(long)]
    pub no_headers: bool,

    /// Column layout: FIELD[,ALIGN[,FUNCTION[=ARG]]] entries joined by the separator
    #[arg(short = 'o', long, env = "SVCPS_FORMAT")]
    pub format: Option<String>,

    /// Separator between column entries in --format
    #[arg(long, env = "SVCPS_FORMAT_SEP")]
    pub format_sep: Option<String>,

    /// Alignment for columns that do not specify one ("L" or "R")
    #[arg(long)]
    pub default_align: Option<String>,

    /// Aggregate the table instead of printing one row per process
    #[arg(long, value_enum)]
    pub aggregate: Option<AggregateArg>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,
}

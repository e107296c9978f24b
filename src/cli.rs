//! CLI arguments and subcommands for tab-chaos-analyzer.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for analysis results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Tab lifecycle event kinds accepted by `track`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventKind {
    Created,
    Activated,
    Removed,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "tab-chaos-analyzer",
    about = "Classify browser tabs, find duplicates and stale tabs, and score resource load",
    long_about = "Classify browser tabs, find duplicates and stale tabs, and score resource load.\n\n\
                  Reads tab lists, access-time maps and resource snapshots exported by the \
                  browser extension and reports categories, chaos level, memory/CPU totals \
                  and cleanup recommendations.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level; overrides `log_level` from the config file [default: info]
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Category rules file (TOML, replaces the built-in table)
    #[arg(long, global = true)]
    pub rules_file: Option<PathBuf>,

    /// Chaos level table file (TOML, replaces the built-in table)
    #[arg(long, global = true)]
    pub chaos_levels_file: Option<PathBuf>,

    /// Age in days after which a tab counts as old
    #[arg(long, global = true)]
    pub old_tab_days: Option<u32>,

    /// Reference memory (MB) for the memory load gauge
    #[arg(long, global = true)]
    pub memory_baseline_mb: Option<f64>,

    /// Parallel classification threads (0 = auto)
    #[arg(long, global = true)]
    pub parallelism: Option<usize>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify tabs into categories
    Classify {
        /// Tab list (JSON array)
        #[arg(short = 't', long)]
        tabs: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List duplicate tabs grouped by normalized URL
    Duplicates {
        /// Tab list (JSON array)
        #[arg(short = 't', long)]
        tabs: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List tabs not accessed within the configured number of days
    Old {
        /// Tab list (JSON array)
        #[arg(short = 't', long)]
        tabs: PathBuf,

        /// Access-time map (JSON object of tab id to Unix ms)
        #[arg(short = 'a', long)]
        access_times: PathBuf,

        /// Reference time in Unix ms (default: now)
        #[arg(long)]
        now_ms: Option<i64>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Full report: categories, duplicates, old tabs, resources and recommendations
    Report {
        /// Tab list (JSON array)
        #[arg(short = 't', long)]
        tabs: PathBuf,

        /// Resource snapshot (JSON)
        #[arg(short = 's', long)]
        snapshot: Option<PathBuf>,

        /// Access-time map (JSON object of tab id to Unix ms)
        #[arg(short = 'a', long)]
        access_times: Option<PathBuf>,

        /// Reference time in Unix ms (default: now)
        #[arg(long)]
        now_ms: Option<i64>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Poll a resource snapshot file and print load updates
    Watch {
        /// Tab list (JSON array), re-read every cycle
        #[arg(short = 't', long)]
        tabs: PathBuf,

        /// Resource snapshot (JSON), re-read every cycle
        #[arg(short = 's', long)]
        snapshot: PathBuf,

        /// Seconds between scans (override config)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after N cycles (default: run until interrupted)
        #[arg(short = 'n', long)]
        iterations: Option<u64>,
    },

    /// Record a tab lifecycle event in an access-time file
    Track {
        /// Access-time map (JSON object), created if missing
        #[arg(short = 'a', long)]
        access_times: PathBuf,

        /// Event kind
        #[arg(value_enum)]
        event: EventKind,

        /// Tab id
        tab_id: i64,

        /// Event time in Unix ms (default: now)
        #[arg(long)]
        at_ms: Option<i64>,
    },

    /// List category rules
    Categories {
        /// Show keywords and patterns
        #[arg(long)]
        verbose: bool,

        /// Filter by category name
        #[arg(short = 'g', long)]
        category: Option<String>,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Generate synthetic tabs, access times and a resource snapshot
    GenerateTestdata {
        /// Output directory
        #[arg(short = 'o', long, default_value = "testdata")]
        output_dir: PathBuf,

        /// Number of tabs to generate
        #[arg(long, default_value_t = 40)]
        tabs: usize,

        /// Share of tabs that duplicate an earlier tab (0.0-1.0)
        #[arg(long, default_value_t = 0.1)]
        duplicate_ratio: f64,
    },
}

//! CLI command implementations for tab-chaos-analyzer.
//!
//! This module provides implementations for all CLI subcommands:
//! - `classify`: Category grouping
//! - `duplicates`: Duplicate tab listing
//! - `old`: Stale tab listing
//! - `report`: Full analysis report
//! - `watch`: Snapshot polling loop
//! - `track`: Access-time bookkeeping
//! - `categories`: Category rule listing
//! - `config`: Configuration file generation
//! - `generate`: Test data generation

pub mod categories;
pub mod classify;
pub mod config;
pub mod duplicates;
pub mod generate;
pub mod old;
pub mod report;
pub mod track;
pub mod watch;

// Re-export command functions
pub use categories::command_categories;
pub use classify::command_classify;
pub use config::command_config;
pub use duplicates::command_duplicates;
pub use generate::command_generate_testdata;
pub use old::command_old;
pub use report::command_report;
pub use track::command_track;
pub use watch::command_watch;

use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tab_chaos_analyzer::platform::{AccessTimeStore, FileAccessStore, FileTabSource, TabSource};
use tab_chaos_analyzer::{AccessTimes, Tab};

use crate::cli::OutputFormat;

/// Current time in Unix milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Prints a value as JSON, or YAML for every other format. Commands render
/// their own text output before reaching this.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml | OutputFormat::Text => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

pub fn load_tabs(path: &Path) -> anyhow::Result<Vec<Tab>> {
    FileTabSource::new(path)
        .query_tabs()
        .with_context(|| format!("Failed to load tab list from {}", path.display()))
}

pub fn load_access_times(path: &Path) -> anyhow::Result<AccessTimes> {
    FileAccessStore::new(path)
        .access_times()
        .with_context(|| format!("Failed to load access times from {}", path.display()))
}

/// Shortens a title for single-line display.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }
}

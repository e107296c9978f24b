//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(output: Option<PathBuf>, format: ConfigFormat, commented: bool) -> anyhow::Result<()> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("tab-chaos-analyzer.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Tab Chaos Analyzer Configuration
# ================================
#
# Logging
# -------
# log_level: "info"              # off, error, warn, info, debug, trace (--log-level wins)
#
# Classification Tables
# ---------------------
# rules_file: null               # Category rules TOML (null = built-in table)
# chaos_levels_file: null        # Chaos level TOML (null = built-in table)
# heavy_domains: null            # Resource-heavy hostnames (null = built-in list)
#
# Analysis
# --------
# old_tab_days: 7                # Tabs idle longer than this are old
# memory_baseline_mb: 8192       # Reference memory for the load gauge
# top_n_consumers: 5             # Tabs listed as top consumers
# recommendation_limit: 3        # Maximum recommendations per report
# parallelism: null              # Classification threads (null = auto)
#
# Monitor Polling
# ---------------
# scan_interval_seconds: 5       # Seconds between snapshot fetches in watch mode
# fetch_retries: 3               # Attempts per snapshot fetch
# fetch_backoff_ms: 250          # First retry delay, doubled per attempt
#
# Scoring Thresholds
# ------------------
# thresholds:
#   heavy_tab_count: 50          # More tabs than this is heavy impact
#   heavy_domain_count: 5        # More heavy-site tabs than this is heavy impact
#   medium_tab_count: 25
#   medium_domain_count: 2
#   loaded_ratio: 0.7            # Loaded share above this is medium impact
#   memory_pressure_percent: 80  # Memory load above this triggers a recommendation
"#;

    format!("{comments}\n{yaml}")
}

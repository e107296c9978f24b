//! Configuration management for tab-chaos-analyzer.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use anyhow::{anyhow, bail, Context};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tab_chaos_analyzer::analyzer::{
    DEFAULT_OLD_TAB_DAYS, DEFAULT_RECOMMENDATION_LIMIT, DEFAULT_TOP_N_CONSUMERS,
};
use tab_chaos_analyzer::resources::DEFAULT_MEMORY_BASELINE_MB;
use tab_chaos_analyzer::{
    AnalyzerConfig, ChaosLevelTable, HeavyDomains, RuleTable, ScoreThresholds,
};
use tracing::info;

use crate::cli::{Args, ConfigFormat, LogLevel};

// Default configuration constants
pub const DEFAULT_SCAN_INTERVAL: u64 = 5;
pub const DEFAULT_FETCH_RETRIES: u32 = 3;
pub const DEFAULT_FETCH_BACKOFF_MS: u64 = 250;

/// Enhanced configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Logging
    pub log_level: Option<String>,

    // Classification tables
    /// Category rules TOML file; the built-in table is used when unset
    #[serde(alias = "rules-file")]
    pub rules_file: Option<PathBuf>,
    /// Chaos level TOML file; the built-in table is used when unset
    #[serde(alias = "chaos-levels-file")]
    pub chaos_levels_file: Option<PathBuf>,
    /// Resource-heavy hostnames; the built-in list is used when unset
    #[serde(alias = "heavy-domains")]
    pub heavy_domains: Option<Vec<String>>,

    // Analysis
    #[serde(alias = "old-tab-days")]
    pub old_tab_days: Option<u32>,
    #[serde(alias = "memory-baseline-mb")]
    pub memory_baseline_mb: Option<f64>,
    #[serde(alias = "top-n-consumers")]
    pub top_n_consumers: Option<usize>,
    #[serde(alias = "recommendation-limit")]
    pub recommendation_limit: Option<usize>,
    pub parallelism: Option<usize>,

    // Monitor polling
    #[serde(alias = "scan-interval-seconds")]
    pub scan_interval_seconds: Option<u64>,
    #[serde(alias = "fetch-retries")]
    pub fetch_retries: Option<u32>,
    #[serde(alias = "fetch-backoff-ms")]
    pub fetch_backoff_ms: Option<u64>,

    // Scoring thresholds (kept last so TOML output stays valid)
    #[serde(default)]
    pub thresholds: ScoreThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            rules_file: None,
            chaos_levels_file: None,
            heavy_domains: None,
            old_tab_days: Some(DEFAULT_OLD_TAB_DAYS),
            memory_baseline_mb: Some(DEFAULT_MEMORY_BASELINE_MB),
            top_n_consumers: Some(DEFAULT_TOP_N_CONSUMERS),
            recommendation_limit: Some(DEFAULT_RECOMMENDATION_LIMIT),
            parallelism: None,
            scan_interval_seconds: Some(DEFAULT_SCAN_INTERVAL),
            fetch_retries: Some(DEFAULT_FETCH_RETRIES),
            fetch_backoff_ms: Some(DEFAULT_FETCH_BACKOFF_MS),
            thresholds: ScoreThresholds::default(),
        }
    }
}

/// Parses the configured log level, `info` when unset.
pub fn effective_log_level(cfg: &Config) -> anyhow::Result<LogLevel> {
    match cfg.log_level.as_deref() {
        None => Ok(LogLevel::Info),
        Some(s) => LogLevel::from_str(s.trim(), true)
            .map_err(|_| anyhow!("log_level must be one of off, error, warn, info, debug, trace, got {:?}", s)),
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> anyhow::Result<()> {
    effective_log_level(cfg)?;

    if let Some(baseline) = cfg.memory_baseline_mb {
        if !baseline.is_finite() || baseline <= 0.0 {
            bail!("memory_baseline_mb must be a positive number, got {}", baseline);
        }
    }

    if cfg.scan_interval_seconds == Some(0) {
        bail!("scan_interval_seconds must be at least 1");
    }

    if cfg.recommendation_limit == Some(0) {
        bail!("recommendation_limit must be at least 1");
    }

    let t = &cfg.thresholds;
    if !(0.0..=1.0).contains(&t.loaded_ratio) {
        bail!("thresholds.loaded_ratio must be within 0.0-1.0, got {}", t.loaded_ratio);
    }
    if t.medium_tab_count > t.heavy_tab_count {
        bail!(
            "thresholds.medium_tab_count ({}) exceeds thresholds.heavy_tab_count ({})",
            t.medium_tab_count,
            t.heavy_tab_count
        );
    }
    if t.medium_domain_count > t.heavy_domain_count {
        bail!(
            "thresholds.medium_domain_count ({}) exceeds thresholds.heavy_domain_count ({})",
            t.medium_domain_count,
            t.heavy_domain_count
        );
    }

    for (name, path) in [
        ("rules_file", &cfg.rules_file),
        ("chaos_levels_file", &cfg.chaos_levels_file),
    ] {
        if let Some(p) = path {
            if !p.exists() {
                bail!("{} not found: {}", name, p.display());
            }
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }
    if let Some(p) = &args.rules_file {
        config.rules_file = Some(p.clone());
    }
    if let Some(p) = &args.chaos_levels_file {
        config.chaos_levels_file = Some(p.clone());
    }
    if let Some(days) = args.old_tab_days {
        config.old_tab_days = Some(days);
    }
    if let Some(mb) = args.memory_baseline_mb {
        config.memory_baseline_mb = Some(mb);
    }
    if let Some(threads) = args.parallelism {
        config.parallelism = Some(threads);
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            // Try default locations
            let defaults = [
                "/etc/tab-chaos-analyzer/config.yaml",
                "/etc/tab-chaos-analyzer/config.yml",
                "/etc/tab-chaos-analyzer/config.json",
                "./tab-chaos-analyzer.yaml",
                "./tab-chaos-analyzer.yml",
                "./tab-chaos-analyzer.json",
                "./tab-chaos-analyzer.toml",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON config {}", path.display()))?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid TOML config {}", path.display()))?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML config {}", path.display()))?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Serializes a configuration in the requested format.
pub fn render_config(config: &Config, format: &ConfigFormat) -> anyhow::Result<String> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: &ConfigFormat) -> anyhow::Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

/// Builds the analyzer's injected tables from the effective configuration.
pub fn build_analyzer_config(cfg: &Config) -> anyhow::Result<AnalyzerConfig> {
    let rules = match &cfg.rules_file {
        Some(p) => RuleTable::from_file(p)
            .with_context(|| format!("Failed to load category rules from {}", p.display()))?,
        None => RuleTable::builtin(),
    };

    let chaos_levels = match &cfg.chaos_levels_file {
        Some(p) => ChaosLevelTable::from_file(p)
            .with_context(|| format!("Failed to load chaos levels from {}", p.display()))?,
        None => ChaosLevelTable::builtin(),
    };

    let heavy_domains = match &cfg.heavy_domains {
        Some(list) => HeavyDomains::new(list),
        None => HeavyDomains::builtin(),
    };

    Ok(AnalyzerConfig {
        rules,
        chaos_levels,
        heavy_domains,
        thresholds: cfg.thresholds.clone(),
        memory_baseline_mb: cfg.memory_baseline_mb.unwrap_or(DEFAULT_MEMORY_BASELINE_MB),
        old_tab_days: cfg.old_tab_days.unwrap_or(DEFAULT_OLD_TAB_DAYS),
        top_n_consumers: cfg.top_n_consumers.unwrap_or(DEFAULT_TOP_N_CONSUMERS),
        recommendation_limit: cfg
            .recommendation_limit
            .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT),
    })
}

//! Report command implementation.
//!
//! Runs every analysis over one tab list and prints the summary.

use anyhow::Context;
use std::path::Path;
use std::time::Duration;
use tab_chaos_analyzer::platform::{FileResourceMonitor, ResourceMonitor, RetryPolicy};
use tab_chaos_analyzer::{AccessTimes, Priority, ResourceSnapshot, TabAnalyzer, TabSummary};

use super::{load_access_times, load_tabs, now_ms, print_structured, truncate};
use crate::cli::OutputFormat;
use crate::config::{Config, DEFAULT_FETCH_BACKOFF_MS, DEFAULT_FETCH_RETRIES};

/// Builds the snapshot retry policy from the effective config.
pub fn retry_policy(cfg: &Config) -> RetryPolicy {
    RetryPolicy {
        attempts: cfg.fetch_retries.unwrap_or(DEFAULT_FETCH_RETRIES),
        backoff: Duration::from_millis(cfg.fetch_backoff_ms.unwrap_or(DEFAULT_FETCH_BACKOFF_MS)),
    }
}

/// Reads a snapshot off the runtime thread; the file monitor sleeps between
/// retries.
pub async fn load_snapshot(path: &Path, retry: RetryPolicy) -> anyhow::Result<ResourceSnapshot> {
    let monitor = FileResourceMonitor::new(path, retry);
    let snapshot = tokio::task::spawn_blocking(move || monitor.fetch_snapshot())
        .await
        .context("Snapshot reader task failed")?
        .with_context(|| format!("Failed to read resource snapshot {}", path.display()))?;
    Ok(snapshot)
}

/// Prints a full report. Snapshot and access times are optional; without
/// them resource figures are zero and no tab counts as old.
pub async fn command_report(
    tabs_path: &Path,
    snapshot_path: Option<&Path>,
    access_path: Option<&Path>,
    now: Option<i64>,
    format: OutputFormat,
    analyzer: &TabAnalyzer,
    cfg: &Config,
) -> anyhow::Result<()> {
    let tabs = load_tabs(tabs_path)?;

    let access_times = match access_path {
        Some(p) => load_access_times(p)?,
        None => AccessTimes::new(),
    };

    let snapshot = match snapshot_path {
        Some(p) => load_snapshot(p, retry_policy(cfg)).await?,
        None => ResourceSnapshot::default(),
    };

    let summary = analyzer.summarize(&tabs, &access_times, &snapshot, now.unwrap_or_else(now_ms));

    match format {
        OutputFormat::Text => {
            print_text(&summary);
            Ok(())
        }
        other => print_structured(&summary, other),
    }
}

fn priority_icon(p: Priority) -> &'static str {
    match p {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

fn print_text(summary: &TabSummary) {
    let agg = &summary.aggregate;

    println!("📊 Tab Chaos Report");
    println!("===================");
    println!(
        "\n🌪️  Chaos level: {} ({}%)",
        summary.chaos_level.name, summary.chaos_level.percentage
    );
    println!("   {}", summary.chaos_level.message);
    println!("\n⚡ Impact: {}", summary.score.tier);
    println!("   {}", summary.score.detail);

    println!("\n🧠 Resources ({} measurement)", agg.mode);
    println!("{}", "─".repeat(50));
    println!("   ├─ Tabs:        {} ({} loaded)", agg.total_tab_count, agg.loaded_tab_count);
    println!("   ├─ Heavy tabs:  {}", summary.heavy_tab_count);
    println!("   ├─ Memory:      {:.1} MB ({:.0}% load)", agg.total_memory_mb, agg.memory_load_percent);
    println!("   └─ Avg CPU:     {:.1}%", agg.average_cpu_percent);

    if !summary.categories.is_empty() {
        println!("\n🗂️  Categories");
        println!("{}", "─".repeat(50));
        for c in &summary.categories {
            let usage = summary.category_usage.iter().find(|u| u.category == c.name);
            match usage {
                Some(u) => println!("   ├─ {} {}: {} tabs, {:.1} MB", c.icon, c.name, c.tabs.len(), u.memory_mb),
                None => println!("   ├─ {} {}: {} tabs", c.icon, c.name, c.tabs.len()),
            }
        }
    }

    if !summary.top_consumers.is_empty() {
        println!("\n🔥 Top consumers");
        println!("{}", "─".repeat(50));
        for t in &summary.top_consumers {
            println!(
                "   ├─ [{}] {} ({:.1} MB, {:.1}% CPU)",
                t.tab_id,
                truncate(&t.title, 50),
                t.memory_mb,
                t.cpu_percent
            );
        }
    }

    println!(
        "\n🔁 Duplicates: {}   🕰️  Old: {}",
        summary.duplicate_ids.len(),
        summary.old_tab_ids.len()
    );

    println!("\n💡 Recommendations");
    println!("{}", "─".repeat(50));
    for r in &summary.recommendations {
        println!("   {} {}", priority_icon(r.priority), r.message);
    }

    let plan = &summary.optimization_plan;
    if !plan.is_empty() {
        println!(
            "\n🧹 Cleanup plan: close {} tabs, discard {} tabs",
            plan.close.len(),
            plan.discard.len()
        );
    }
}

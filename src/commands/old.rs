//! Old tabs command implementation.
//!
//! Lists tabs whose last recorded access exceeds the configured age.

use serde::Serialize;
use std::path::Path;
use tab_chaos_analyzer::{TabAnalyzer, TabId, DAY_MS};

use super::{load_access_times, load_tabs, now_ms, print_structured, truncate};
use crate::cli::OutputFormat;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OldTab {
    tab_id: TabId,
    title: String,
    url: String,
    idle_days: f64,
}

/// Prints old tabs, oldest first.
pub fn command_old(
    tabs_path: &Path,
    access_path: &Path,
    now: Option<i64>,
    format: OutputFormat,
    analyzer: &TabAnalyzer,
) -> anyhow::Result<()> {
    let tabs = load_tabs(tabs_path)?;
    let access_times = load_access_times(access_path)?;
    let now = now.unwrap_or_else(now_ms);

    let old_ids = analyzer.old_tabs(&tabs, &access_times, now);
    let mut old: Vec<OldTab> = tabs
        .iter()
        .filter(|t| old_ids.contains(&t.id))
        .map(|t| OldTab {
            tab_id: t.id,
            title: t.title.clone(),
            url: t.url.clone(),
            idle_days: access_times
                .get(&t.id)
                .map(|&accessed| (now - accessed) as f64 / DAY_MS as f64)
                .unwrap_or(0.0),
        })
        .collect();
    old.sort_by(|a, b| b.idle_days.total_cmp(&a.idle_days));

    if !matches!(format, OutputFormat::Text) {
        return print_structured(&old, format);
    }

    println!(
        "🕰️  Tabs idle for more than {} days",
        analyzer.config().old_tab_days
    );
    println!("=====================================");

    for t in &old {
        println!(
            "   ├─ [{}] {} ({:.1} days)",
            t.tab_id,
            truncate(&t.title, 60),
            t.idle_days
        );
    }

    println!("\n📋 Total: {} of {} tabs are old", old.len(), tabs.len());
    Ok(())
}

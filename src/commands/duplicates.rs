//! Duplicates command implementation.
//!
//! Lists tabs that share a normalized URL.

use std::path::Path;
use tab_chaos_analyzer::TabAnalyzer;

use super::{load_tabs, print_structured};
use crate::cli::OutputFormat;

/// Prints duplicate groups in order of first appearance.
pub fn command_duplicates(tabs_path: &Path, format: OutputFormat, analyzer: &TabAnalyzer) -> anyhow::Result<()> {
    let tabs = load_tabs(tabs_path)?;
    let groups = analyzer.duplicate_groups(&tabs);

    if !matches!(format, OutputFormat::Text) {
        return print_structured(&groups, format);
    }

    println!("🔁 Duplicate Tabs");
    println!("=================");

    if groups.is_empty() {
        println!("\n✅ No duplicate tabs");
        return Ok(());
    }

    let mut total = 0;
    for group in &groups {
        total += group.tab_ids.len();
        let ids: Vec<String> = group.tab_ids.iter().map(|id| id.to_string()).collect();
        println!("\n   ├─ {}", group.normalized_url);
        println!("   │  └─ Tabs: {}", ids.join(", "));
    }

    println!("\n📋 Total: {} duplicate tabs across {} URLs", total, groups.len());
    Ok(())
}

//! Classify command implementation.
//!
//! Groups tabs by category in rule priority order.

use std::path::Path;
use tab_chaos_analyzer::TabAnalyzer;

use super::{load_tabs, print_structured, truncate};
use crate::cli::OutputFormat;

/// Classifies tabs and prints the non-empty categories.
pub fn command_classify(tabs_path: &Path, format: OutputFormat, analyzer: &TabAnalyzer) -> anyhow::Result<()> {
    let tabs = load_tabs(tabs_path)?;
    let summaries = analyzer.category_summaries(&analyzer.classify_all(&tabs));

    if !matches!(format, OutputFormat::Text) {
        return print_structured(&summaries, format);
    }

    println!("🗂️  Tab Categories");
    println!("=================");

    for category in &summaries {
        let icon = if category.icon.is_empty() { "📁" } else { category.icon.as_str() };
        println!("\n{} {} ({})", icon, category.name, category.tabs.len());
        println!("{}", "─".repeat(50));
        for t in &category.tabs {
            let marker = if t.is_duplicate { " 🔁" } else { "" };
            println!("   ├─ [{}] {}{}", t.tab.id, truncate(&t.tab.title, 60), marker);
        }
    }

    println!(
        "\n📋 Total: {} tabs in {} categories",
        tabs.len(),
        summaries.len()
    );
    Ok(())
}

//! Categories command implementation.
//!
//! Lists the category rules in classification priority order.

use tab_chaos_analyzer::{RuleTable, UNCATEGORIZED};

/// Lists category rules, optionally filtered by name.
pub fn command_categories(rules: &RuleTable, verbose: bool, category: Option<String>) -> anyhow::Result<()> {
    println!("🗂️  Tab Chaos Analyzer - Category Rules");
    println!("======================================");

    let mut shown = 0;
    for (rank, rule) in rules.rules().iter().enumerate() {
        if let Some(filter) = &category {
            if !rule.name.to_lowercase().contains(&filter.to_lowercase()) {
                continue;
            }
        }
        shown += 1;

        println!("\n{} {} (priority {})", rule.icon, rule.name, rank + 1);
        println!("{}", "─".repeat(50));

        if verbose {
            for keyword in &rule.keywords {
                println!("   ├─ 🔍 Keyword: {}", keyword);
            }
            for pattern in &rule.patterns {
                println!("   ├─ 🧩 Pattern: {}", pattern.as_str());
            }
        } else {
            let examples: Vec<&str> = rule.keywords.iter().take(3).map(String::as_str).collect();
            println!(
                "   ├─ {} keywords, {} patterns",
                rule.keywords.len(),
                rule.patterns.len()
            );
            if !examples.is_empty() {
                println!("   └─ Examples: {}", examples.join(", "));
            }
        }
    }

    println!(
        "\n📋 Total: {} of {} categories shown (unmatched tabs go to {})",
        shown,
        rules.len(),
        UNCATEGORIZED
    );

    Ok(())
}

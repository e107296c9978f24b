//! Tab classification against a [`RuleTable`].
//!
//! Classification is a pure function of a tab's url and title for a fixed
//! table, so every pass recomputes from the current tab list.

use ahash::AHashMap as HashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::dedup::find_duplicates;
use crate::model::{CategorizedTab, Tab};
use crate::rules::{RuleTable, UNCATEGORIZED};

/// Categorized tabs keyed by category name. Categories without members are
/// never present.
pub type CategoryGroups = HashMap<String, Vec<CategorizedTab>>;

/// Returns the name of the first rule matching the tab, or `Uncategorized`.
///
/// Tabs with an empty url or title are `Uncategorized` without consulting
/// the table.
pub fn classify<'a>(tab: &Tab, rules: &'a RuleTable) -> &'a str {
    if tab.url.is_empty() || tab.title.is_empty() {
        return UNCATEGORIZED;
    }

    let url_lower = tab.url.to_lowercase();
    let title_lower = tab.title.to_lowercase();

    rules
        .rules()
        .iter()
        .find(|rule| rule.matches(&tab.url, &tab.title, &url_lower, &title_lower))
        .map(|rule| rule.name.as_str())
        .unwrap_or(UNCATEGORIZED)
}

/// Classifies every tab, flags duplicates and groups the result by category.
///
/// Within a group tabs keep their input order.
pub fn classify_all(tabs: &[Tab], rules: &RuleTable) -> CategoryGroups {
    let duplicates = find_duplicates(tabs);

    let categories: Vec<&str> = tabs.par_iter().map(|tab| classify(tab, rules)).collect();

    let mut groups = CategoryGroups::new();
    for (tab, category) in tabs.iter().zip(categories) {
        groups
            .entry(category.to_string())
            .or_default()
            .push(CategorizedTab {
                tab: tab.clone(),
                category: category.to_string(),
                is_duplicate: duplicates.contains(&tab.id),
            });
    }

    debug!(
        "Classified {} tabs into {} categories ({} duplicates)",
        tabs.len(),
        groups.len(),
        duplicates.len()
    );

    groups
}

/// Category names of `groups` in rule-table priority order, `Uncategorized`
/// last.
pub fn ordered_categories<'a>(groups: &'a CategoryGroups, rules: &RuleTable) -> Vec<&'a str> {
    let mut names: Vec<&str> = groups.keys().map(String::as_str).collect();
    names.sort_by(|a, b| rules.rank(a).cmp(&rules.rank(b)).then_with(|| a.cmp(b)));
    names
}

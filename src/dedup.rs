//! Duplicate tab detection by normalized URL.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use serde::Serialize;
use url::Url;

use crate::model::{Tab, TabId};

/// Normalizes a URL for duplicate comparison.
///
/// Returns `scheme://host[:port]` followed by the path with one trailing
/// slash removed; query string and fragment are dropped. Input that does not
/// parse as a URL is returned unchanged.
pub fn normalize(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return url.to_string(),
    };

    let host = match (parsed.host_str(), parsed.port()) {
        (Some(h), Some(p)) => format!("{h}:{p}"),
        (Some(h), None) => h.to_string(),
        (None, _) => String::new(),
    };
    let path = parsed.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    format!("{}://{}{}", parsed.scheme(), host, path)
}

/// Returns the ids of every tab whose normalized URL is shared with at least
/// one other tab.
pub fn find_duplicates(tabs: &[Tab]) -> HashSet<TabId> {
    let mut first_seen: HashMap<String, TabId> = HashMap::with_capacity(tabs.len());
    let mut duplicates = HashSet::new();

    for tab in tabs {
        let key = normalize(&tab.url);
        match first_seen.get(&key) {
            Some(&first) => {
                duplicates.insert(first);
                duplicates.insert(tab.id);
            }
            None => {
                first_seen.insert(key, tab.id);
            }
        }
    }

    duplicates
}

/// Tabs sharing one normalized URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub normalized_url: String,
    /// Member ids in tab-list order.
    pub tab_ids: Vec<TabId>,
}

/// Groups duplicate tabs by normalized URL, in order of first appearance.
/// URLs open only once are omitted.
pub fn duplicate_groups(tabs: &[Tab]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(tabs.len());
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for tab in tabs {
        let key = normalize(&tab.url);
        match index.get(&key) {
            Some(&i) => groups[i].tab_ids.push(tab.id),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    normalized_url: key,
                    tab_ids: vec![tab.id],
                });
            }
        }
    }

    groups.retain(|g| g.tab_ids.len() > 1);
    groups
}

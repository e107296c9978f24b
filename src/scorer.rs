//! Performance impact scoring, recommendations and optimization plans.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dedup::DuplicateGroup;
use crate::model::{Tab, TabId};

/// Hostnames known to be resource intensive.
#[derive(Debug, Clone, Default)]
pub struct HeavyDomains {
    hosts: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct HeavyDomainsFile {
    domains: Vec<String>,
}

static BUILTIN_HEAVY_DOMAINS: Lazy<Vec<String>> = Lazy::new(|| {
    toml::from_str::<HeavyDomainsFile>(include_str!("../data/heavy_domains.toml"))
        .map(|f| f.domains)
        .unwrap_or_else(|e| panic!("built-in heavy domain list is invalid: {e}"))
});

impl HeavyDomains {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_HEAVY_DOMAINS.iter())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// True if the URL parses and its hostname is in the set.
    pub fn is_heavy(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| self.hosts.contains(h)))
            .unwrap_or(false)
    }
}

/// Number of tabs on a heavy domain.
pub fn heavy_tab_count(tabs: &[Tab], heavy: &HeavyDomains) -> usize {
    tabs.iter().filter(|t| heavy.is_heavy(&t.url)).count()
}

/// Scoring thresholds. Counts are exclusive lower bounds ("more than").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreThresholds {
    #[serde(default = "default_heavy_tab_count")]
    pub heavy_tab_count: usize,
    #[serde(default = "default_heavy_domain_count")]
    pub heavy_domain_count: usize,
    #[serde(default = "default_medium_tab_count")]
    pub medium_tab_count: usize,
    #[serde(default = "default_medium_domain_count")]
    pub medium_domain_count: usize,
    #[serde(default = "default_loaded_ratio")]
    pub loaded_ratio: f64,
    #[serde(default = "default_memory_pressure_percent")]
    pub memory_pressure_percent: f64,
}

fn default_heavy_tab_count() -> usize {
    50
}
fn default_heavy_domain_count() -> usize {
    5
}
fn default_medium_tab_count() -> usize {
    25
}
fn default_medium_domain_count() -> usize {
    2
}
fn default_loaded_ratio() -> f64 {
    0.7
}
fn default_memory_pressure_percent() -> f64 {
    80.0
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            heavy_tab_count: default_heavy_tab_count(),
            heavy_domain_count: default_heavy_domain_count(),
            medium_tab_count: default_medium_tab_count(),
            medium_domain_count: default_medium_domain_count(),
            loaded_ratio: default_loaded_ratio(),
            memory_pressure_percent: default_memory_pressure_percent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTier {
    Light,
    Medium,
    Heavy,
}

impl std::fmt::Display for ImpactTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpactTier::Light => write!(f, "light"),
            ImpactTier::Medium => write!(f, "medium"),
            ImpactTier::Heavy => write!(f, "heavy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScore {
    pub tier: ImpactTier,
    pub detail: String,
}

/// Classifies the browser's performance impact. The heavy check runs first.
pub fn score(total_tabs: usize, heavy_tabs: usize, loaded_ratio: f64, t: &ScoreThresholds) -> PerformanceScore {
    let tier = if total_tabs > t.heavy_tab_count || heavy_tabs > t.heavy_domain_count {
        ImpactTier::Heavy
    } else if total_tabs > t.medium_tab_count
        || heavy_tabs > t.medium_domain_count
        || loaded_ratio > t.loaded_ratio
    {
        ImpactTier::Medium
    } else {
        ImpactTier::Light
    };

    let detail = match tier {
        ImpactTier::Heavy => format!(
            "High impact: {total_tabs} tabs open, {heavy_tabs} on resource-heavy sites"
        ),
        ImpactTier::Medium => format!(
            "Moderate impact: {total_tabs} tabs open, {heavy_tabs} heavy, {:.0}% loaded",
            loaded_ratio * 100.0
        ),
        ImpactTier::Light => format!("Low impact: {total_tabs} tabs open"),
    };

    PerformanceScore { tier, detail }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    CloseTabs,
    SuspendHeavyTabs,
    FreeMemory,
    CloseDuplicates,
    ArchiveOldTabs,
    DiscardInactive,
    GroupTabs,
    Optimized,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: RecommendationAction,
    pub message: String,
}

/// Signals feeding [`recommendations`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationInput {
    pub total_tabs: usize,
    pub heavy_tabs: usize,
    pub loaded_ratio: f64,
    pub duplicate_tabs: usize,
    pub old_tabs: usize,
    pub memory_load_percent: f64,
}

/// Suggested actions, high priority first, at most `limit` entries (never
/// fewer than one). When no condition triggers the list holds a single
/// `Optimized` entry.
pub fn recommendations(input: &RecommendationInput, t: &ScoreThresholds, limit: usize) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let mut push = |priority, action, message: String| {
        out.push(Recommendation {
            priority,
            action,
            message,
        })
    };

    if input.total_tabs > t.heavy_tab_count {
        push(
            Priority::High,
            RecommendationAction::CloseTabs,
            format!("Close tabs: {} are open, aim for {} or fewer", input.total_tabs, t.medium_tab_count),
        );
    }
    if input.heavy_tabs > t.heavy_domain_count {
        push(
            Priority::High,
            RecommendationAction::SuspendHeavyTabs,
            format!("Suspend {} tabs on resource-heavy sites", input.heavy_tabs),
        );
    }
    if input.memory_load_percent > t.memory_pressure_percent {
        push(
            Priority::High,
            RecommendationAction::FreeMemory,
            format!("Tabs are using {:.0}% of the memory budget", input.memory_load_percent),
        );
    }
    if input.duplicate_tabs > 0 {
        push(
            Priority::Medium,
            RecommendationAction::CloseDuplicates,
            format!("Close duplicates: {} tabs share a URL with another tab", input.duplicate_tabs),
        );
    }
    if input.old_tabs > 0 {
        push(
            Priority::Medium,
            RecommendationAction::ArchiveOldTabs,
            format!("Bookmark and close {} tabs you have not visited in a while", input.old_tabs),
        );
    }
    if input.loaded_ratio > t.loaded_ratio && input.total_tabs > t.medium_tab_count {
        push(
            Priority::Medium,
            RecommendationAction::DiscardInactive,
            format!("Discard inactive tabs: {:.0}% are loaded in memory", input.loaded_ratio * 100.0),
        );
    }
    if input.total_tabs > t.medium_tab_count {
        push(
            Priority::Low,
            RecommendationAction::GroupTabs,
            "Group related tabs by category to find them faster".to_string(),
        );
    }

    if out.is_empty() {
        return vec![Recommendation {
            priority: Priority::Low,
            action: RecommendationAction::Optimized,
            message: "Your browser is optimized. Nothing to clean up.".to_string(),
        }];
    }

    out.sort_by_key(|r| r.priority);
    out.truncate(limit.max(1));
    out
}

/// Actions for the platform collaborator to carry out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptimizationPlan {
    pub close: Vec<TabId>,
    pub discard: Vec<TabId>,
}

impl OptimizationPlan {
    pub fn is_empty(&self) -> bool {
        self.close.is_empty() && self.discard.is_empty()
    }
}

/// Plans a cleanup: every duplicate except one keeper per group is closed (the
/// active tab when the group has one, otherwise the first seen), and old tabs
/// that are not active, not already discarded and not being closed are
/// discarded.
pub fn plan_optimization(tabs: &[Tab], duplicates: &[DuplicateGroup], old_tabs: &[TabId]) -> OptimizationPlan {
    let by_id: HashMap<TabId, &Tab> = tabs.iter().map(|t| (t.id, t)).collect();
    let mut close = Vec::new();

    for group in duplicates {
        let keeper = group
            .tab_ids
            .iter()
            .copied()
            .find(|id| by_id.get(id).is_some_and(|t| t.active))
            .or_else(|| group.tab_ids.first().copied());
        close.extend(group.tab_ids.iter().copied().filter(|id| Some(*id) != keeper));
    }

    let closing: HashSet<TabId> = close.iter().copied().collect();
    let discard = old_tabs
        .iter()
        .copied()
        .filter(|id| !closing.contains(id))
        .filter(|id| by_id.get(id).is_some_and(|t| !t.active && !t.discarded))
        .collect();

    OptimizationPlan { close, discard }
}

//! The analyzer facade.
//!
//! [`TabAnalyzer`] owns the configuration tables handed to it at
//! construction and exposes every analysis as a plain function call. Nothing
//! here is global, so tests can build as many independent instances as they
//! like.

use serde::Serialize;
use tracing::{debug, info};

use crate::chaos::{ChaosLevel, ChaosLevelTable};
use crate::classifier::{classify, classify_all, ordered_categories, CategoryGroups};
use crate::dedup::{duplicate_groups, find_duplicates, DuplicateGroup};
use crate::model::{loaded_ratio, CategorizedTab, Tab, TabId};
use crate::old_tabs::{find_old, AccessTimes};
use crate::resources::{
    AggregateReport, CategoryUsage, ResourceAggregator, ResourceSnapshot, TabUsage,
    DEFAULT_MEMORY_BASELINE_MB,
};
use crate::rules::RuleTable;
use crate::scorer::{
    heavy_tab_count, plan_optimization, recommendations, score, HeavyDomains, OptimizationPlan,
    PerformanceScore, Recommendation, RecommendationInput, ScoreThresholds,
};

/// Default age after which a tab counts as old.
pub const DEFAULT_OLD_TAB_DAYS: u32 = 7;
pub const DEFAULT_TOP_N_CONSUMERS: usize = 5;
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

/// Immutable configuration injected into a [`TabAnalyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub rules: RuleTable,
    pub chaos_levels: ChaosLevelTable,
    pub heavy_domains: HeavyDomains,
    pub thresholds: ScoreThresholds,
    pub memory_baseline_mb: f64,
    pub old_tab_days: u32,
    pub top_n_consumers: usize,
    pub recommendation_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rules: RuleTable::builtin(),
            chaos_levels: ChaosLevelTable::builtin(),
            heavy_domains: HeavyDomains::builtin(),
            thresholds: ScoreThresholds::default(),
            memory_baseline_mb: DEFAULT_MEMORY_BASELINE_MB,
            old_tab_days: DEFAULT_OLD_TAB_DAYS,
            top_n_consumers: DEFAULT_TOP_N_CONSUMERS,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

/// One category with its members, as presented to display collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub tabs: Vec<CategorizedTab>,
}

/// Everything derived from one tab list and one snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub generated_at_ms: i64,
    pub categories: Vec<CategorySummary>,
    pub duplicate_ids: Vec<TabId>,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub old_tab_ids: Vec<TabId>,
    pub chaos_level: ChaosLevel,
    pub heavy_tab_count: usize,
    pub loaded_ratio: f64,
    pub aggregate: AggregateReport,
    pub category_usage: Vec<CategoryUsage>,
    pub top_consumers: Vec<TabUsage>,
    pub score: PerformanceScore,
    pub recommendations: Vec<Recommendation>,
    pub optimization_plan: OptimizationPlan,
}

pub struct TabAnalyzer {
    config: AnalyzerConfig,
    aggregator: ResourceAggregator,
}

impl TabAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let aggregator = ResourceAggregator::new(config.memory_baseline_mb);
        debug!(
            "Analyzer ready: {} rules, {} chaos levels, {} heavy domains",
            config.rules.len(),
            config.chaos_levels.levels().len(),
            config.heavy_domains.len()
        );
        Self { config, aggregator }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn aggregator(&self) -> ResourceAggregator {
        self.aggregator
    }

    pub fn classify<'a>(&'a self, tab: &Tab) -> &'a str {
        classify(tab, &self.config.rules)
    }

    pub fn classify_all(&self, tabs: &[Tab]) -> CategoryGroups {
        classify_all(tabs, &self.config.rules)
    }

    /// Duplicate ids, sorted.
    pub fn duplicates(&self, tabs: &[Tab]) -> Vec<TabId> {
        let mut ids: Vec<TabId> = find_duplicates(tabs).into_iter().collect();
        ids.sort_unstable();
        ids
    }

    pub fn duplicate_groups(&self, tabs: &[Tab]) -> Vec<DuplicateGroup> {
        duplicate_groups(tabs)
    }

    pub fn chaos_level(&self, tab_count: usize) -> &ChaosLevel {
        self.config.chaos_levels.level_for(tab_count as u64)
    }

    pub fn old_tabs(&self, tabs: &[Tab], access_times: &AccessTimes, now_ms: i64) -> Vec<TabId> {
        find_old(tabs, access_times, self.config.old_tab_days, now_ms)
    }

    pub fn aggregate(&self, tabs: &[Tab], snapshot: &ResourceSnapshot) -> AggregateReport {
        self.aggregator.aggregate(tabs, snapshot)
    }

    pub fn heavy_tab_count(&self, tabs: &[Tab]) -> usize {
        heavy_tab_count(tabs, &self.config.heavy_domains)
    }

    pub fn score(&self, total_tabs: usize, heavy_tabs: usize, loaded_ratio: f64) -> PerformanceScore {
        score(total_tabs, heavy_tabs, loaded_ratio, &self.config.thresholds)
    }

    pub fn recommendations(&self, input: &RecommendationInput) -> Vec<Recommendation> {
        recommendations(input, &self.config.thresholds, self.config.recommendation_limit)
    }

    /// Orders groups by rule priority and attaches display metadata.
    pub fn category_summaries(&self, groups: &CategoryGroups) -> Vec<CategorySummary> {
        ordered_categories(groups, &self.config.rules)
            .into_iter()
            .map(|name| {
                let rule = self.config.rules.get(name);
                CategorySummary {
                    name: name.to_string(),
                    icon: rule.map(|r| r.icon.clone()).unwrap_or_default(),
                    color: rule.map(|r| r.color.clone()).unwrap_or_default(),
                    tabs: groups[name].clone(),
                }
            })
            .collect()
    }

    /// Runs every analysis over one tab list and snapshot.
    pub fn summarize(
        &self,
        tabs: &[Tab],
        access_times: &AccessTimes,
        snapshot: &ResourceSnapshot,
        now_ms: i64,
    ) -> TabSummary {
        let groups = self.classify_all(tabs);
        let duplicate_ids = self.duplicates(tabs);
        let duplicate_groups = self.duplicate_groups(tabs);
        let old_tab_ids = self.old_tabs(tabs, access_times, now_ms);
        let heavy_tabs = self.heavy_tab_count(tabs);
        let ratio = loaded_ratio(tabs);
        let aggregate = self.aggregate(tabs, snapshot);

        let input = RecommendationInput {
            total_tabs: tabs.len(),
            heavy_tabs,
            loaded_ratio: ratio,
            duplicate_tabs: duplicate_ids.len(),
            old_tabs: old_tab_ids.len(),
            memory_load_percent: aggregate.memory_load_percent,
        };

        let summary = TabSummary {
            generated_at_ms: now_ms,
            category_usage: self.aggregator.category_usage(&groups, snapshot),
            top_consumers: self
                .aggregator
                .top_consumers(&groups, snapshot, self.config.top_n_consumers),
            categories: self.category_summaries(&groups),
            chaos_level: self.chaos_level(tabs.len()).clone(),
            score: self.score(tabs.len(), heavy_tabs, ratio),
            recommendations: self.recommendations(&input),
            optimization_plan: plan_optimization(tabs, &duplicate_groups, &old_tab_ids),
            duplicate_ids,
            duplicate_groups,
            old_tab_ids,
            heavy_tab_count: heavy_tabs,
            loaded_ratio: ratio,
            aggregate,
        };

        info!(
            "Summarized {} tabs: chaos={}, impact={}, {} duplicates, {} old",
            tabs.len(),
            summary.chaos_level.name,
            summary.score.tier,
            summary.duplicate_ids.len(),
            summary.old_tab_ids.len()
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_builtin_tables() {
        let analyzer = TabAnalyzer::new(AnalyzerConfig::default());
        assert!(!analyzer.config().rules.is_empty());
        assert_eq!(analyzer.chaos_level(0).name, "excellent");
        assert_eq!(analyzer.aggregator().memory_baseline_mb(), 8192.0);
    }

    #[test]
    fn test_classify_with_builtin_rules() {
        let analyzer = TabAnalyzer::new(AnalyzerConfig::default());
        let tab = Tab::new(1, "https://github.com/rust-lang/rust", "rust-lang/rust");
        assert_eq!(analyzer.classify(&tab), "Development");
    }

    #[test]
    fn test_summarize_empty() {
        let analyzer = TabAnalyzer::new(AnalyzerConfig::default());
        let summary = analyzer.summarize(&[], &AccessTimes::new(), &ResourceSnapshot::default(), 0);
        assert!(summary.categories.is_empty());
        assert!(summary.duplicate_ids.is_empty());
        assert_eq!(summary.aggregate.total_memory_mb, 0.0);
        assert_eq!(summary.recommendations.len(), 1);
        assert!(summary.optimization_plan.is_empty());
    }

    #[test]
    fn test_category_summaries_carry_rule_metadata() {
        let analyzer = TabAnalyzer::new(AnalyzerConfig::default());
        let tabs = vec![
            Tab::new(1, "https://example.invalid/zzz", "nothing here"),
            Tab::new(2, "https://github.com/", "GitHub"),
        ];
        let summaries = analyzer.category_summaries(&analyzer.classify_all(&tabs));
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Development");
        assert!(!summaries[0].icon.is_empty());
        assert_eq!(summaries[1].name, "Uncategorized");
        assert!(summaries[1].icon.is_empty());
    }
}

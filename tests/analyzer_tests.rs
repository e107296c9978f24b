//! Integration tests for the analyzer facade.
//!
//! These tests drive `TabAnalyzer` end to end with the built-in tables and
//! check the cross-module behavior: classification precedence, duplicate
//! symmetry, old-tab thresholds, scoring and recommendations.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tab_chaos_analyzer::{
    AccessTimes, AnalyzerConfig, ChaosLevelTable, ImpactTier, MeasurementMode, Priority,
    RecommendationAction, ResourceSample, ResourceSnapshot, RuleTable, Tab, TabAnalyzer, DAY_MS,
    UNCATEGORIZED,
};

const NOW: i64 = 1_700_000_000_000;

fn analyzer() -> TabAnalyzer {
    TabAnalyzer::new(AnalyzerConfig::default())
}

/// 60 distinct tabs: 6 on a heavy video site, 6 discarded.
fn crowded_window() -> Vec<Tab> {
    let mut tabs = Vec::new();
    for i in 0..6 {
        tabs.push(Tab::new(
            i,
            format!("https://www.youtube.com/@channel{i}"),
            format!("Channel {i} - YouTube"),
        ));
    }
    for i in 6..60 {
        let mut tab = Tab::new(
            i,
            format!("https://site{i}.example.com/page"),
            format!("Page {i}"),
        );
        tab.discarded = i >= 54;
        tabs.push(tab);
    }
    tabs
}

#[test]
fn test_crowded_window_scenario() {
    let analyzer = analyzer();
    let tabs = crowded_window();

    let summary = analyzer.summarize(&tabs, &AccessTimes::new(), &ResourceSnapshot::default(), NOW);

    assert_eq!(summary.heavy_tab_count, 6);
    assert!((summary.loaded_ratio - 0.9).abs() < 1e-9);
    assert_eq!(summary.score.tier, ImpactTier::Heavy);
    assert_eq!(summary.chaos_level.name, "apocalyptic");
    assert!(summary.duplicate_ids.is_empty());

    let actions: Vec<RecommendationAction> =
        summary.recommendations.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![
            RecommendationAction::CloseTabs,
            RecommendationAction::SuspendHeavyTabs,
            RecommendationAction::DiscardInactive,
        ]
    );
    assert_eq!(summary.recommendations[0].priority, Priority::High);
}

#[test]
fn test_empty_input_is_safe() {
    let analyzer = analyzer();

    assert!(analyzer.classify_all(&[]).is_empty());
    assert!(analyzer.duplicates(&[]).is_empty());
    assert!(analyzer.old_tabs(&[], &AccessTimes::new(), NOW).is_empty());
    assert_eq!(analyzer.chaos_level(0).name, "excellent");

    let report = analyzer.aggregate(&[], &ResourceSnapshot::default());
    assert_eq!(report.total_memory_mb, 0.0);
    assert_eq!(report.average_cpu_percent, 0.0);
    assert_eq!(report.loaded_tab_count, 0);
    assert_eq!(report.mode, MeasurementMode::Heuristic);

    let score = analyzer.score(0, 0, 0.0);
    assert_eq!(score.tier, ImpactTier::Light);
}

#[test]
fn test_earlier_rule_wins() {
    let analyzer = analyzer();
    // Matches both the social keyword and the video pattern.
    let tab = Tab::new(1, "https://www.facebook.com/watch?v=123", "Watch");
    assert_eq!(analyzer.classify(&tab), "Social");
}

#[test]
fn test_missing_title_is_uncategorized() {
    let analyzer = analyzer();
    let tab = Tab::new(1, "https://github.com/", "");
    assert_eq!(analyzer.classify(&tab), UNCATEGORIZED);
}

/// Category and duplicate flag per tab id, independent of group order.
fn labels(groups: &tab_chaos_analyzer::CategoryGroups) -> BTreeMap<i64, (String, bool)> {
    groups
        .values()
        .flatten()
        .map(|t| (t.tab.id, (t.category.clone(), t.is_duplicate)))
        .collect()
}

#[test]
fn test_classification_is_deterministic() {
    let analyzer = analyzer();
    let mut tabs = crowded_window();
    tabs.push(Tab::new(60, "https://github.com/rust-lang/rust", "rust-lang/rust"));
    tabs.push(Tab::new(61, "https://github.com/rust-lang/rust/", "rust-lang/rust"));
    tabs.push(Tab::new(62, "https://www.facebook.com/watch?v=123", "Watch"));

    let first = analyzer.classify(&tabs[62]).to_string();
    for _ in 0..10 {
        assert_eq!(analyzer.classify(&tabs[62]), first);
    }

    let expected = labels(&analyzer.classify_all(&tabs));
    assert_eq!(expected.len(), tabs.len());
    assert_eq!(expected[&60], expected[&61]);
    assert!(expected[&60].1);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let mut shuffled = tabs.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(labels(&analyzer.classify_all(&shuffled)), expected);
    }
}

#[test]
fn test_duplicates_are_symmetric() {
    let analyzer = analyzer();
    let tabs = vec![
        Tab::new(1, "https://docs.rs/serde/latest/serde/", "serde"),
        Tab::new(2, "https://news.ycombinator.com/", "Hacker News"),
        Tab::new(3, "https://docs.rs/serde/latest/serde?search=de", "serde"),
        Tab::new(4, "https://docs.rs/serde/latest/serde#impl", "serde"),
    ];

    assert_eq!(analyzer.duplicates(&tabs), vec![1, 3, 4]);

    let groups = analyzer.duplicate_groups(&tabs);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].normalized_url, "https://docs.rs/serde/latest/serde");
    assert_eq!(groups[0].tab_ids, vec![1, 3, 4]);
}

#[test]
fn test_old_tab_threshold_is_strict() {
    let analyzer = analyzer();
    let tabs = vec![
        Tab::new(1, "https://a.example.com/", "A"),
        Tab::new(2, "https://b.example.com/", "B"),
        Tab::new(3, "https://c.example.com/", "C"),
    ];
    let mut times = AccessTimes::new();
    times.insert(1, NOW - 7 * DAY_MS);
    times.insert(2, NOW - 7 * DAY_MS - 1);

    // Tab 3 has no recorded access and is never old.
    assert_eq!(analyzer.old_tabs(&tabs, &times, NOW), vec![2]);
}

#[test]
fn test_summary_plans_cleanup() {
    let analyzer = analyzer();
    let mut tabs = vec![
        Tab::new(1, "https://github.com/tokio-rs/tokio", "tokio"),
        Tab::new(2, "https://github.com/tokio-rs/tokio/", "tokio"),
        Tab::new(3, "https://en.wikipedia.org/wiki/Entropy", "Entropy"),
    ];
    tabs[1].active = true;

    let mut times = AccessTimes::new();
    times.insert(1, NOW - 30 * DAY_MS);
    times.insert(3, NOW - 30 * DAY_MS);

    let summary = analyzer.summarize(&tabs, &times, &ResourceSnapshot::default(), NOW);

    assert_eq!(summary.optimization_plan.close, vec![1]);
    assert_eq!(summary.optimization_plan.discard, vec![3]);
    let actions: Vec<RecommendationAction> =
        summary.recommendations.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![RecommendationAction::CloseDuplicates, RecommendationAction::ArchiveOldTabs]
    );
}

#[test]
fn test_category_usage_follows_snapshot() {
    let analyzer = analyzer();
    let tabs = vec![
        Tab::new(1, "https://github.com/", "GitHub"),
        Tab::new(2, "https://www.youtube.com/", "YouTube"),
    ];
    let mut snapshot = ResourceSnapshot::default();
    snapshot.tab_resources.insert(
        2,
        ResourceSample {
            tab_id: 2,
            mode: MeasurementMode::Heuristic,
            memory_estimate_mb: 400.0,
            cpu_estimate_percent: 12.0,
            ..ResourceSample::default()
        },
    );

    let summary = analyzer.summarize(&tabs, &AccessTimes::new(), &snapshot, NOW);

    assert_eq!(summary.aggregate.total_memory_mb, 400.0);
    assert_eq!(summary.aggregate.average_cpu_percent, 12.0);
    assert_eq!(summary.category_usage[0].category, "Video");
    assert_eq!(summary.top_consumers[0].tab_id, 2);
}

#[test]
fn test_custom_tables_are_injected() {
    let rules = RuleTable::from_toml_str(
        r#"
[[categories]]
name = "Reading"
keywords = ["example"]
"#,
    )
    .expect("valid rules");
    let levels = ChaosLevelTable::from_toml_str(
        r##"
[[levels]]
name = "calm"
min = 0
max = 1
message = "calm"
color = "#fff"
percentage = 10

[[levels]]
name = "busy"
min = 2
message = "busy"
color = "#000"
percentage = 100
"##,
    )
    .expect("valid levels");

    let analyzer = TabAnalyzer::new(AnalyzerConfig {
        rules,
        chaos_levels: levels,
        ..AnalyzerConfig::default()
    });

    let tabs = vec![
        Tab::new(1, "https://example.com/", "Example"),
        Tab::new(2, "https://github.com/", "GitHub"),
    ];
    assert_eq!(analyzer.classify(&tabs[0]), "Reading");
    assert_eq!(analyzer.classify(&tabs[1]), UNCATEGORIZED);
    assert_eq!(analyzer.chaos_level(tabs.len()).name, "busy");
}

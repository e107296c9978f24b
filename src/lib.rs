//! Tab Chaos Analyzer Library
//!
//! Classifies browser tabs into categories, detects duplicate and stale tabs,
//! and turns per-tab resource samples into system-wide load figures, a chaos
//! level and an impact score with recommendations.
//!
//! Every analysis is a pure function over the data handed in. Configuration
//! tables are built once and injected through [`AnalyzerConfig`]; the tab
//! list, access times and resource snapshots come from platform
//! collaborators (see [`platform`]).
//!
//! # Usage
//!
//! ```rust
//! use tab_chaos_analyzer::{AccessTimes, AnalyzerConfig, ResourceSnapshot, Tab, TabAnalyzer};
//!
//! let analyzer = TabAnalyzer::new(AnalyzerConfig::default());
//!
//! let tabs = vec![
//!     Tab::new(1, "https://github.com/rust-lang/rust", "rust-lang/rust"),
//!     Tab::new(2, "https://github.com/rust-lang/rust/", "rust-lang/rust"),
//! ];
//!
//! let summary = analyzer.summarize(&tabs, &AccessTimes::new(), &ResourceSnapshot::default(), 0);
//! assert_eq!(summary.duplicate_ids, vec![1, 2]);
//! println!("Chaos level: {}", summary.chaos_level.name);
//! ```

pub mod analyzer;
pub mod chaos;
pub mod classifier;
pub mod dedup;
pub mod error;
pub mod model;
pub mod monitor;
pub mod old_tabs;
pub mod platform;
pub mod resources;
pub mod rules;
pub mod scorer;

// Re-export main types for convenience
pub use analyzer::{AnalyzerConfig, CategorySummary, TabAnalyzer, TabSummary};
pub use chaos::{ChaosLevel, ChaosLevelTable};
pub use classifier::{classify, classify_all, CategoryGroups};
pub use dedup::{duplicate_groups, find_duplicates, normalize, DuplicateGroup};
pub use error::AnalyzerError;
pub use model::{parse_tab_list, CategorizedTab, Tab, TabId, TabStatus};
pub use monitor::{MonitorLoop, MonitorUpdate};
pub use old_tabs::{find_old, AccessTimes, DAY_MS};
pub use resources::{
    AggregateReport, CategoryUsage, MeasurementMode, ResourceAggregator, ResourceSample,
    ResourceSnapshot, ResourceTracker, SystemSnapshot, TabUsage,
};
pub use rules::{CategoryRule, CategoryRuleDef, RuleTable, UNCATEGORIZED};
pub use scorer::{
    heavy_tab_count, plan_optimization, recommendations, score, HeavyDomains, ImpactTier,
    OptimizationPlan, PerformanceScore, Priority, Recommendation, RecommendationAction,
    RecommendationInput, ScoreThresholds,
};

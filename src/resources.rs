//! Resource aggregation over per-tab samples.
//!
//! An external monitor delivers a complete [`ResourceSnapshot`] every scan
//! cycle. Reports are recomputed from scratch for each snapshot, so a dropped
//! or out-of-order delivery is corrected by the next one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::classifier::CategoryGroups;
use crate::model::{Tab, TabId};

/// Reference system memory used for the memory-load gauge.
pub const DEFAULT_MEMORY_BASELINE_MB: f64 = 8192.0;

/// How a sample was obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    /// Measured directly by the platform.
    Precise,
    /// Estimated by a fallback heuristic.
    #[default]
    Heuristic,
}

impl std::fmt::Display for MeasurementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasurementMode::Precise => write!(f, "precise"),
            MeasurementMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Most recent resource reading for one tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSample {
    pub tab_id: TabId,
    pub mode: MeasurementMode,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    #[serde(rename = "memoryEstimateMB")]
    pub memory_estimate_mb: f64,
    pub cpu_percent: f64,
    pub cpu_estimate_percent: f64,
    pub timestamp_ms: i64,
}

impl ResourceSample {
    /// Memory for aggregation: the measured value in precise mode, the
    /// estimate otherwise.
    pub fn effective_memory_mb(&self) -> f64 {
        match self.mode {
            MeasurementMode::Precise => non_negative(self.memory_mb),
            MeasurementMode::Heuristic => non_negative(self.memory_estimate_mb),
        }
    }

    pub fn effective_cpu_percent(&self) -> f64 {
        match self.mode {
            MeasurementMode::Precise => non_negative(self.cpu_percent),
            MeasurementMode::Heuristic => non_negative(self.cpu_estimate_percent),
        }
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// System-wide memory figures reported by the monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemSnapshot {
    #[serde(rename = "totalMemoryMB")]
    pub total_memory_mb: f64,
    pub used_percent: f64,
    #[serde(rename = "availableMB")]
    pub available_mb: f64,
}

/// One complete monitor delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSnapshot {
    pub tab_resources: BTreeMap<TabId, ResourceSample>,
    pub system_resources: SystemSnapshot,
    pub last_update_ms: i64,
    pub scan_count: u64,
}

impl ResourceSnapshot {
    pub fn sample(&self, tab_id: TabId) -> Option<&ResourceSample> {
        self.tab_resources.get(&tab_id)
    }
}

/// System-level totals for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    #[serde(rename = "totalMemoryMB")]
    pub total_memory_mb: f64,
    pub average_cpu_percent: f64,
    pub loaded_tab_count: usize,
    pub total_tab_count: usize,
    pub sampled_tab_count: usize,
    pub mode: MeasurementMode,
    pub memory_load_percent: f64,
    pub system: SystemSnapshot,
}

/// Totals for the tabs of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    pub category: String,
    pub tab_count: usize,
    pub sampled_tab_count: usize,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    pub average_cpu_percent: f64,
}

/// A single tab's effective usage, for top-consumer listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabUsage {
    pub tab_id: TabId,
    pub title: String,
    pub category: String,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    pub cpu_percent: f64,
    pub mode: MeasurementMode,
}

/// Stateless aggregation over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAggregator {
    memory_baseline_mb: f64,
}

impl Default for ResourceAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_BASELINE_MB)
    }
}

impl ResourceAggregator {
    pub fn new(memory_baseline_mb: f64) -> Self {
        Self { memory_baseline_mb }
    }

    pub fn memory_baseline_mb(&self) -> f64 {
        self.memory_baseline_mb
    }

    /// Memory load against the baseline, capped at 100.
    pub fn memory_load_percent(&self, total_memory_mb: f64) -> f64 {
        (ratio(total_memory_mb, self.memory_baseline_mb) * 100.0).min(100.0)
    }

    /// Builds the system report. Sample totals come from the snapshot, tab
    /// counts from the tab list; the two may legitimately disagree.
    pub fn aggregate(&self, tabs: &[Tab], snapshot: &ResourceSnapshot) -> AggregateReport {
        let mut total_memory_mb = 0.0;
        let mut total_cpu = 0.0;
        let mut any_precise = false;

        for sample in snapshot.tab_resources.values() {
            total_memory_mb += sample.effective_memory_mb();
            total_cpu += sample.effective_cpu_percent();
            any_precise |= sample.mode == MeasurementMode::Precise;
        }

        let sampled_tab_count = snapshot.tab_resources.len();
        let report = AggregateReport {
            total_memory_mb,
            average_cpu_percent: ratio(total_cpu, sampled_tab_count as f64),
            loaded_tab_count: tabs.iter().filter(|t| t.is_loaded()).count(),
            total_tab_count: tabs.len(),
            sampled_tab_count,
            mode: if any_precise {
                MeasurementMode::Precise
            } else {
                MeasurementMode::Heuristic
            },
            memory_load_percent: self.memory_load_percent(total_memory_mb),
            system: snapshot.system_resources,
        };

        debug!(
            "Aggregated {} samples: {:.1} MB, {:.1}% avg CPU, mode={}",
            sampled_tab_count, report.total_memory_mb, report.average_cpu_percent, report.mode
        );

        report
    }

    /// Per-category totals, heaviest category first. Categories whose tabs
    /// have no samples report zero usage.
    pub fn category_usage(&self, groups: &CategoryGroups, snapshot: &ResourceSnapshot) -> Vec<CategoryUsage> {
        let mut usage: Vec<CategoryUsage> = groups
            .iter()
            .map(|(category, tabs)| {
                let mut memory_mb = 0.0;
                let mut cpu = 0.0;
                let mut sampled = 0usize;
                for sample in tabs.iter().filter_map(|t| snapshot.sample(t.tab.id)) {
                    memory_mb += sample.effective_memory_mb();
                    cpu += sample.effective_cpu_percent();
                    sampled += 1;
                }
                CategoryUsage {
                    category: category.clone(),
                    tab_count: tabs.len(),
                    sampled_tab_count: sampled,
                    memory_mb,
                    average_cpu_percent: ratio(cpu, sampled as f64),
                }
            })
            .collect();

        usage.sort_by(|a, b| {
            b.memory_mb
                .total_cmp(&a.memory_mb)
                .then_with(|| a.category.cmp(&b.category))
        });
        usage
    }

    /// The `limit` sampled tabs using the most memory.
    pub fn top_consumers(&self, groups: &CategoryGroups, snapshot: &ResourceSnapshot, limit: usize) -> Vec<TabUsage> {
        let mut usage: Vec<TabUsage> = groups
            .values()
            .flatten()
            .filter_map(|t| {
                snapshot.sample(t.tab.id).map(|s| TabUsage {
                    tab_id: t.tab.id,
                    title: t.tab.title.clone(),
                    category: t.category.clone(),
                    memory_mb: s.effective_memory_mb(),
                    cpu_percent: s.effective_cpu_percent(),
                    mode: s.mode,
                })
            })
            .collect();

        usage.sort_by(|a, b| {
            b.memory_mb
                .total_cmp(&a.memory_mb)
                .then_with(|| a.tab_id.cmp(&b.tab_id))
        });
        usage.truncate(limit);
        usage
    }
}

/// Holds the latest snapshot. Each ingest replaces the previous one wholesale.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    aggregator: ResourceAggregator,
    latest: Option<ResourceSnapshot>,
    ingested: u64,
}

impl ResourceTracker {
    pub fn new(aggregator: ResourceAggregator) -> Self {
        Self {
            aggregator,
            latest: None,
            ingested: 0,
        }
    }

    /// Replaces the retained snapshot and returns the report for it.
    pub fn ingest(&mut self, snapshot: ResourceSnapshot, tabs: &[Tab]) -> AggregateReport {
        let report = self.aggregator.aggregate(tabs, &snapshot);
        self.latest = Some(snapshot);
        self.ingested += 1;
        report
    }

    pub fn latest(&self) -> Option<&ResourceSnapshot> {
        self.latest.as_ref()
    }

    /// Number of snapshots ingested so far.
    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    /// Report for the retained snapshot, or an all-zero sample view when none
    /// has arrived yet.
    pub fn report(&self, tabs: &[Tab]) -> AggregateReport {
        match &self.latest {
            Some(snapshot) => self.aggregator.aggregate(tabs, snapshot),
            None => self.aggregator.aggregate(tabs, &ResourceSnapshot::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CategorizedTab;

    fn precise(tab_id: TabId, memory_mb: f64, cpu: f64) -> ResourceSample {
        ResourceSample {
            tab_id,
            mode: MeasurementMode::Precise,
            memory_mb,
            cpu_percent: cpu,
            ..ResourceSample::default()
        }
    }

    fn heuristic(tab_id: TabId, estimate_mb: f64, cpu: f64) -> ResourceSample {
        ResourceSample {
            tab_id,
            mode: MeasurementMode::Heuristic,
            memory_mb: 999.0,
            memory_estimate_mb: estimate_mb,
            cpu_estimate_percent: cpu,
            ..ResourceSample::default()
        }
    }

    fn snapshot(samples: Vec<ResourceSample>) -> ResourceSnapshot {
        ResourceSnapshot {
            tab_resources: samples.into_iter().map(|s| (s.tab_id, s)).collect(),
            ..ResourceSnapshot::default()
        }
    }

    #[test]
    fn test_mixed_precision_totals() {
        let snap = snapshot(vec![precise(1, 100.0, 10.0), heuristic(2, 50.0, 20.0)]);
        let report = ResourceAggregator::default().aggregate(&[], &snap);

        assert_eq!(report.total_memory_mb, 150.0);
        assert_eq!(report.average_cpu_percent, 15.0);
        assert_eq!(report.mode, MeasurementMode::Precise);
        assert_eq!(report.sampled_tab_count, 2);
    }

    #[test]
    fn test_all_heuristic_mode() {
        let snap = snapshot(vec![heuristic(1, 10.0, 1.0)]);
        let report = ResourceAggregator::default().aggregate(&[], &snap);
        assert_eq!(report.mode, MeasurementMode::Heuristic);
    }

    #[test]
    fn test_empty_snapshot_is_all_zero() {
        let report = ResourceAggregator::default().aggregate(&[], &ResourceSnapshot::default());
        assert_eq!(report.total_memory_mb, 0.0);
        assert_eq!(report.average_cpu_percent, 0.0);
        assert_eq!(report.memory_load_percent, 0.0);
        assert_eq!(report.total_tab_count, 0);
        assert!(!report.average_cpu_percent.is_nan());
    }

    #[test]
    fn test_memory_load_capped() {
        let agg = ResourceAggregator::default();
        assert_eq!(agg.memory_load_percent(4096.0), 50.0);
        assert_eq!(agg.memory_load_percent(20_000.0), 100.0);
        assert_eq!(ResourceAggregator::new(0.0).memory_load_percent(100.0), 0.0);
        assert_eq!(ResourceAggregator::new(1000.0).memory_load_percent(250.0), 25.0);
    }

    #[test]
    fn test_invalid_values_clamped() {
        let snap = snapshot(vec![precise(1, -5.0, f64::NAN), precise(2, 10.0, f64::INFINITY)]);
        let report = ResourceAggregator::default().aggregate(&[], &snap);
        assert_eq!(report.total_memory_mb, 10.0);
        assert_eq!(report.average_cpu_percent, 0.0);
    }

    #[test]
    fn test_tab_counts_come_from_tab_list() {
        let mut discarded = Tab::new(2, "https://b.com", "b");
        discarded.discarded = true;
        let tabs = vec![Tab::new(1, "https://a.com", "a"), discarded, Tab::new(3, "https://c.com", "c")];
        let snap = snapshot(vec![precise(1, 10.0, 1.0)]);

        let report = ResourceAggregator::default().aggregate(&tabs, &snap);
        assert_eq!(report.total_tab_count, 3);
        assert_eq!(report.loaded_tab_count, 2);
        assert_eq!(report.sampled_tab_count, 1);
    }

    fn categorized(id: TabId, category: &str) -> CategorizedTab {
        CategorizedTab {
            tab: Tab::new(id, format!("https://t{id}.com"), format!("Tab {id}")),
            category: category.to_string(),
            is_duplicate: false,
        }
    }

    #[test]
    fn test_category_usage_sorted_by_memory() {
        let mut groups = CategoryGroups::new();
        groups.insert("Video".into(), vec![categorized(1, "Video"), categorized(2, "Video")]);
        groups.insert("Dev".into(), vec![categorized(3, "Dev")]);
        groups.insert("News".into(), vec![categorized(4, "News")]);

        let snap = snapshot(vec![precise(1, 300.0, 10.0), heuristic(2, 100.0, 30.0), precise(3, 50.0, 5.0)]);
        let usage = ResourceAggregator::default().category_usage(&groups, &snap);

        assert_eq!(usage.len(), 3);
        assert_eq!(usage[0].category, "Video");
        assert_eq!(usage[0].memory_mb, 400.0);
        assert_eq!(usage[0].average_cpu_percent, 20.0);
        assert_eq!(usage[1].category, "Dev");
        assert_eq!(usage[2].category, "News");
        assert_eq!(usage[2].sampled_tab_count, 0);
        assert_eq!(usage[2].memory_mb, 0.0);
    }

    #[test]
    fn test_top_consumers_limit() {
        let mut groups = CategoryGroups::new();
        groups.insert(
            "Misc".into(),
            vec![categorized(1, "Misc"), categorized(2, "Misc"), categorized(3, "Misc")],
        );
        let snap = snapshot(vec![precise(1, 10.0, 0.0), precise(2, 30.0, 0.0), precise(3, 20.0, 0.0)]);

        let top = ResourceAggregator::default().top_consumers(&groups, &snap, 2);
        assert_eq!(top.iter().map(|t| t.tab_id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_tracker_latest_wins() {
        let mut tracker = ResourceTracker::default();
        assert_eq!(tracker.report(&[]).total_memory_mb, 0.0);

        tracker.ingest(snapshot(vec![precise(1, 100.0, 0.0), precise(2, 100.0, 0.0)]), &[]);
        let report = tracker.ingest(snapshot(vec![heuristic(1, 40.0, 0.0)]), &[]);

        assert_eq!(report.total_memory_mb, 40.0);
        assert_eq!(report.mode, MeasurementMode::Heuristic);
        assert_eq!(tracker.ingested(), 2);
        assert!(tracker.latest().and_then(|s| s.sample(2)).is_none());
        assert_eq!(tracker.report(&[]).total_memory_mb, 40.0);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "tabResources": {
                "7": {"tabId": 7, "mode": "precise", "memoryMB": 120.5, "cpuPercent": 3.0, "timestampMs": 1},
                "8": {"tabId": 8, "mode": "heuristic", "memoryEstimateMB": 60.0, "cpuEstimatePercent": 1.5}
            },
            "systemResources": {"totalMemoryMB": 16384, "usedPercent": 42.0, "availableMB": 9000},
            "lastUpdateMs": 1700000000000,
            "scanCount": 12
        }"#;
        let snap: ResourceSnapshot = serde_json::from_str(json).expect("valid snapshot");
        assert_eq!(snap.scan_count, 12);
        assert_eq!(snap.sample(7).map(|s| s.effective_memory_mb()), Some(120.5));
        assert_eq!(snap.sample(8).map(|s| s.effective_memory_mb()), Some(60.0));
        assert_eq!(snap.system_resources.total_memory_mb, 16384.0);
    }
}

//! Capability interfaces for the platform collaborators.
//!
//! The analyzer never probes its environment. Tab lists, access times and
//! resource snapshots come through these traits, injected by the caller.
//! File-backed implementations read JSON documents and are used by the CLI
//! and tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::AnalyzerError;
use crate::model::{parse_tab_list, Tab, TabId};
use crate::old_tabs::AccessTimes;
use crate::resources::ResourceSnapshot;

/// Source of the current tab list.
pub trait TabSource {
    fn query_tabs(&self) -> Result<Vec<Tab>, AnalyzerError>;
}

/// Store of last-access timestamps, maintained across tab lifecycle events.
pub trait AccessTimeStore {
    fn access_times(&self) -> Result<AccessTimes, AnalyzerError>;
    fn record_access(&mut self, tab_id: TabId, timestamp_ms: i64) -> Result<(), AnalyzerError>;
    fn forget(&mut self, tab_id: TabId) -> Result<(), AnalyzerError>;

    /// Applies a lifecycle event: created/activated upsert, removed deletes.
    fn apply_event(&mut self, event: TabEvent) -> Result<(), AnalyzerError> {
        match event {
            TabEvent::Created { tab_id, at_ms } | TabEvent::Activated { tab_id, at_ms } => {
                self.record_access(tab_id, at_ms)
            }
            TabEvent::Removed { tab_id } => self.forget(tab_id),
        }
    }
}

/// Producer of resource snapshots. Retry policy belongs to the implementation.
pub trait ResourceMonitor {
    fn fetch_snapshot(&self) -> Result<ResourceSnapshot, AnalyzerError>;
}

/// Tab lifecycle events relevant to access tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created { tab_id: TabId, at_ms: i64 },
    Activated { tab_id: TabId, at_ms: i64 },
    Removed { tab_id: TabId },
}

/// In-memory access-time store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccessStore {
    times: AccessTimes,
}

impl MemoryAccessStore {
    pub fn new(times: AccessTimes) -> Self {
        Self { times }
    }
}

impl AccessTimeStore for MemoryAccessStore {
    fn access_times(&self) -> Result<AccessTimes, AnalyzerError> {
        Ok(self.times.clone())
    }

    fn record_access(&mut self, tab_id: TabId, timestamp_ms: i64) -> Result<(), AnalyzerError> {
        self.times.insert(tab_id, timestamp_ms);
        Ok(())
    }

    fn forget(&mut self, tab_id: TabId) -> Result<(), AnalyzerError> {
        self.times.remove(&tab_id);
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, AnalyzerError> {
    fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))
}

/// Reads the tab list from a JSON array file.
#[derive(Debug, Clone)]
pub struct FileTabSource {
    path: PathBuf,
}

impl FileTabSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TabSource for FileTabSource {
    fn query_tabs(&self) -> Result<Vec<Tab>, AnalyzerError> {
        let tabs = parse_tab_list(&read_file(&self.path)?)?;
        debug!("Read {} tabs from {}", tabs.len(), self.path.display());
        Ok(tabs)
    }
}

/// Access times kept in a JSON object file (`{"<tabId>": <ms>}`).
///
/// A missing file reads as an empty map. Updates are written back immediately.
#[derive(Debug, Clone)]
pub struct FileAccessStore {
    path: PathBuf,
}

impl FileAccessStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write(&self, times: &AccessTimes) -> Result<(), AnalyzerError> {
        let content = serde_json::to_string_pretty(times)?;
        fs::write(&self.path, content).map_err(|e| AnalyzerError::io(&self.path, e))
    }
}

impl AccessTimeStore for FileAccessStore {
    fn access_times(&self) -> Result<AccessTimes, AnalyzerError> {
        if !self.path.exists() {
            return Ok(AccessTimes::new());
        }
        let content = read_file(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(AnalyzerError::InvalidInput(format!(
                "access time file {} must contain a JSON object",
                self.path.display()
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn record_access(&mut self, tab_id: TabId, timestamp_ms: i64) -> Result<(), AnalyzerError> {
        let mut times = self.access_times()?;
        times.insert(tab_id, timestamp_ms);
        self.write(&times)
    }

    fn forget(&mut self, tab_id: TabId) -> Result<(), AnalyzerError> {
        let mut times = self.access_times()?;
        if times.remove(&tab_id).is_some() {
            self.write(&times)?;
        }
        Ok(())
    }
}

/// Retry policy for snapshot fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, at least one.
    pub attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Reads snapshots written by an external monitor process.
///
/// The monitor may be mid-write when we read, so unreadable or unparsable
/// content is retried with exponential backoff before giving up.
#[derive(Debug, Clone)]
pub struct FileResourceMonitor {
    path: PathBuf,
    retry: RetryPolicy,
}

impl FileResourceMonitor {
    pub fn new(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            retry,
        }
    }

    fn read_once(&self) -> Result<ResourceSnapshot, AnalyzerError> {
        let content = read_file(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ResourceMonitor for FileResourceMonitor {
    fn fetch_snapshot(&self) -> Result<ResourceSnapshot, AnalyzerError> {
        let attempts = self.retry.attempts.max(1);
        let mut delay = self.retry.backoff;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.read_once() {
                Ok(snapshot) => {
                    debug!(
                        "Fetched snapshot #{} with {} samples (attempt {})",
                        snapshot.scan_count,
                        snapshot.tab_resources.len(),
                        attempt
                    );
                    return Ok(snapshot);
                }
                Err(e) => {
                    warn!(
                        "Snapshot fetch attempt {}/{} from {} failed: {}",
                        attempt,
                        attempts,
                        self.path.display(),
                        e
                    );
                    last_error = e.to_string();
                    if attempt < attempts {
                        thread::sleep(delay);
                        delay = delay.saturating_mul(2);
                    }
                }
            }
        }

        Err(AnalyzerError::SnapshotUnavailable {
            attempts,
            reason: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_lifecycle() {
        let mut store = MemoryAccessStore::default();
        store.apply_event(TabEvent::Created { tab_id: 1, at_ms: 10 }).unwrap();
        store.apply_event(TabEvent::Created { tab_id: 2, at_ms: 20 }).unwrap();
        store.apply_event(TabEvent::Activated { tab_id: 1, at_ms: 30 }).unwrap();
        store.apply_event(TabEvent::Removed { tab_id: 2 }).unwrap();

        let times = store.access_times().unwrap();
        assert_eq!(times.len(), 1);
        assert_eq!(times.get(&1), Some(&30));
    }

    #[test]
    fn test_file_tab_source() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tabs.json");
        fs::write(&path, r#"[{"id": 3, "url": "https://a.com", "title": "A"}]"#).unwrap();

        let tabs = FileTabSource::new(&path).query_tabs().unwrap();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].id, 3);
    }

    #[test]
    fn test_file_tab_source_rejects_non_list() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tabs.json");
        fs::write(&path, r#""tabs""#).unwrap();

        let err = FileTabSource::new(&path).query_tabs().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    }

    #[test]
    fn test_file_access_store_round_trip() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = FileAccessStore::new(dir.path().join("access.json"));

        assert!(store.access_times().unwrap().is_empty());
        store.record_access(5, 1000).unwrap();
        store.record_access(6, 2000).unwrap();
        store.forget(5).unwrap();

        let times = store.access_times().unwrap();
        assert_eq!(times.len(), 1);
        assert_eq!(times.get(&6), Some(&2000));
    }

    #[test]
    fn test_file_monitor_reads_snapshot() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("snapshot.json");
        fs::write(&path, r#"{"tabResources": {}, "scanCount": 4}"#).unwrap();

        let monitor = FileResourceMonitor::new(&path, RetryPolicy::default());
        assert_eq!(monitor.fetch_snapshot().unwrap().scan_count, 4);
    }

    #[test]
    fn test_file_monitor_gives_up_after_retries() {
        let dir = tempdir().expect("Failed to create temp dir");
        let monitor = FileResourceMonitor::new(
            dir.path().join("missing.json"),
            RetryPolicy {
                attempts: 2,
                backoff: Duration::from_millis(1),
            },
        );

        match monitor.fetch_snapshot() {
            Err(AnalyzerError::SnapshotUnavailable { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

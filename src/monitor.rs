//! Periodic resource monitoring.
//!
//! [`MonitorLoop`] polls a [`ResourceMonitor`] on a fixed interval, feeds
//! each snapshot into a [`ResourceTracker`] and publishes a
//! [`MonitorUpdate`] over a channel. A failed fetch keeps the previous
//! snapshot; the loop carries on with the next tick.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::analyzer::TabAnalyzer;
use crate::chaos::ChaosLevel;
use crate::model::loaded_ratio;
use crate::platform::{ResourceMonitor, TabSource};
use crate::resources::{AggregateReport, ResourceTracker};
use crate::scorer::PerformanceScore;

/// Published after every successful scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorUpdate {
    /// Number of snapshots ingested so far, this one included.
    pub scan: u64,
    pub tab_count: usize,
    pub heavy_tab_count: usize,
    pub report: AggregateReport,
    pub chaos_level: ChaosLevel,
    pub score: PerformanceScore,
}

pub struct MonitorLoop<S, M> {
    source: Arc<S>,
    monitor: Arc<M>,
    analyzer: Arc<TabAnalyzer>,
    period: Duration,
    max_scans: Option<u64>,
}

impl<S, M> MonitorLoop<S, M>
where
    S: TabSource + Send + Sync + 'static,
    M: ResourceMonitor + Send + Sync + 'static,
{
    pub fn new(source: Arc<S>, monitor: Arc<M>, analyzer: Arc<TabAnalyzer>, period: Duration) -> Self {
        Self {
            source,
            monitor,
            analyzer,
            period,
            max_scans: None,
        }
    }

    /// Stops after `n` ticks, counting failed ones.
    pub fn with_max_scans(mut self, n: u64) -> Self {
        self.max_scans = Some(n);
        self
    }

    /// Runs until `shutdown` resolves, the receiver is dropped or the scan
    /// limit is reached. Returns the tracker holding the last snapshot.
    #[instrument(skip_all)]
    pub async fn run<F>(self, updates: mpsc::Sender<MonitorUpdate>, shutdown: F) -> ResourceTracker
    where
        F: Future<Output = ()>,
    {
        let mut tracker = ResourceTracker::new(self.analyzer.aggregator());
        let mut ticker = interval(self.period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut ticks: u64 = 0;
        info!("Monitor loop started");

        loop {
            if self.max_scans.is_some_and(|max| ticks >= max) {
                debug!("Scan limit reached after {} ticks", ticks);
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping monitor loop");
                    break;
                }
                _ = ticker.tick() => {}
            }
            ticks += 1;

            match self.scan(&mut tracker).await {
                Ok(update) => {
                    if updates.send(update).await.is_err() {
                        debug!("Update receiver dropped, stopping monitor loop");
                        break;
                    }
                }
                Err(e) => warn!("Scan {} failed, keeping previous snapshot: {}", ticks, e),
            }
        }

        info!("Monitor loop stopped after {} snapshots", tracker.ingested());
        tracker
    }

    async fn scan(&self, tracker: &mut ResourceTracker) -> anyhow::Result<MonitorUpdate> {
        let source = Arc::clone(&self.source);
        let monitor = Arc::clone(&self.monitor);

        // Both collaborators may block on I/O and retry sleeps.
        let (tabs, snapshot) = tokio::task::spawn_blocking(move || {
            let tabs = source.query_tabs()?;
            let snapshot = monitor.fetch_snapshot()?;
            Ok::<_, crate::error::AnalyzerError>((tabs, snapshot))
        })
        .await??;

        let heavy = self.analyzer.heavy_tab_count(&tabs);
        let report = tracker.ingest(snapshot, &tabs);

        Ok(MonitorUpdate {
            scan: tracker.ingested(),
            tab_count: tabs.len(),
            heavy_tab_count: heavy,
            chaos_level: self.analyzer.chaos_level(tabs.len()).clone(),
            score: self.analyzer.score(tabs.len(), heavy, loaded_ratio(&tabs)),
            report,
        })
    }
}

//! Watch command implementation.
//!
//! Polls the tab list and resource snapshot files and prints one line per
//! successful scan until interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tab_chaos_analyzer::platform::{FileResourceMonitor, FileTabSource};
use tab_chaos_analyzer::{MonitorLoop, TabAnalyzer};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;

use super::report::retry_policy;
use crate::config::{Config, DEFAULT_SCAN_INTERVAL};

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Runs the monitor loop and prints updates as they arrive.
pub async fn command_watch(
    tabs: PathBuf,
    snapshot: PathBuf,
    interval: Option<u64>,
    iterations: Option<u64>,
    analyzer: TabAnalyzer,
    cfg: &Config,
) -> anyhow::Result<()> {
    let seconds = interval
        .or(cfg.scan_interval_seconds)
        .unwrap_or(DEFAULT_SCAN_INTERVAL);

    let mut monitor_loop = MonitorLoop::new(
        Arc::new(FileTabSource::new(tabs)),
        Arc::new(FileResourceMonitor::new(snapshot, retry_policy(cfg))),
        Arc::new(analyzer),
        Duration::from_secs(seconds),
    );
    if let Some(n) = iterations {
        monitor_loop = monitor_loop.with_max_scans(n);
    }

    println!("👀 Watching tab resources every {}s (Ctrl+C to stop)", seconds);

    let (tx, mut rx) = mpsc::channel(16);
    let runner = tokio::spawn(monitor_loop.run(tx, shutdown_signal()));

    while let Some(update) = rx.recv().await {
        println!(
            "[scan {:>4}] {:>3} tabs | {:>8.1} MB ({:>3.0}%) | CPU {:>5.1}% | {} | impact {} | {}",
            update.scan,
            update.tab_count,
            update.report.total_memory_mb,
            update.report.memory_load_percent,
            update.report.average_cpu_percent,
            update.chaos_level.name,
            update.score.tier,
            update.report.mode
        );
    }

    let tracker = runner.await?;
    println!("📋 Total: {} snapshots ingested", tracker.ingested());
    Ok(())
}

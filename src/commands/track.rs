//! Track command implementation.
//!
//! Applies a tab lifecycle event to an access-time file.

use anyhow::Context;
use std::path::Path;
use tab_chaos_analyzer::platform::{AccessTimeStore, FileAccessStore, TabEvent};
use tab_chaos_analyzer::TabId;
use tracing::info;

use super::now_ms;
use crate::cli::EventKind;

/// Records a created/activated event or forgets a removed tab.
pub fn command_track(access_path: &Path, kind: EventKind, tab_id: TabId, at: Option<i64>) -> anyhow::Result<()> {
    let at_ms = at.unwrap_or_else(now_ms);
    let event = match kind {
        EventKind::Created => TabEvent::Created { tab_id, at_ms },
        EventKind::Activated => TabEvent::Activated { tab_id, at_ms },
        EventKind::Removed => TabEvent::Removed { tab_id },
    };

    let mut store = FileAccessStore::new(access_path);
    store
        .apply_event(event)
        .with_context(|| format!("Failed to update {}", access_path.display()))?;

    info!("Applied {:?} to {}", event, access_path.display());
    Ok(())
}

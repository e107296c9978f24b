//! Stale tab detection from externally recorded access times.

use std::collections::BTreeMap;

use crate::model::{Tab, TabId};

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// Last-access timestamps (Unix milliseconds) keyed by tab id.
pub type AccessTimes = BTreeMap<TabId, i64>;

/// Returns ids of tabs last accessed more than `threshold_days` before `now_ms`.
///
/// Tabs without a recorded access time are never old. Output keeps tab-list
/// order.
pub fn find_old(tabs: &[Tab], access_times: &AccessTimes, threshold_days: u32, now_ms: i64) -> Vec<TabId> {
    let threshold_ms = i64::from(threshold_days) * DAY_MS;

    tabs.iter()
        .filter(|tab| {
            access_times
                .get(&tab.id)
                .is_some_and(|&accessed| now_ms.saturating_sub(accessed) > threshold_ms)
        })
        .map(|tab| tab.id)
        .collect()
}

//! Generate testdata command implementation.
//!
//! Writes a synthetic tab list, access-time map and resource snapshot that
//! the other subcommands can read.

use anyhow::{bail, Context};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tab_chaos_analyzer::{
    AccessTimes, MeasurementMode, ResourceSample, ResourceSnapshot, SystemSnapshot, Tab, DAY_MS,
};
use tracing::{debug, info};

use super::now_ms;

const SYSTEM_MEMORY_MB: f64 = 16384.0;
const MAX_IDLE_DAYS: i64 = 14;

/// Seed sites spread over the built-in categories plus a few that match none.
const SITES: &[(&str, &str)] = &[
    ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "Music video - YouTube"),
    ("https://www.netflix.com/browse", "Netflix"),
    ("https://www.twitch.tv/directory", "Browse - Twitch"),
    ("https://www.facebook.com/", "Facebook"),
    ("https://www.instagram.com/", "Instagram"),
    ("https://twitter.com/home", "Home / Twitter"),
    ("https://www.reddit.com/r/rust/", "r/rust"),
    ("https://github.com/rust-lang/rust", "rust-lang/rust"),
    ("https://stackoverflow.com/questions/tagged/rust", "Newest 'rust' Questions"),
    ("https://docs.rs/tokio/latest/tokio/", "tokio - Rust"),
    ("https://docs.google.com/document/d/1", "Planning notes - Google Docs"),
    ("https://mail.google.com/mail/u/0/#inbox", "Inbox - Gmail"),
    ("https://app.slack.com/client/T0/C0", "general - Slack"),
    ("https://www.figma.com/file/abc", "Design system - Figma"),
    ("https://www.amazon.com/gp/cart/view.html", "Amazon.com Shopping Cart"),
    ("https://www.ebay.com/", "eBay"),
    ("https://www.bbc.com/news", "BBC News"),
    ("https://www.nytimes.com/", "The New York Times"),
    ("https://www.coursera.org/learn/machine-learning", "Machine Learning - Coursera"),
    ("https://en.wikipedia.org/wiki/Rust_(programming_language)", "Rust - Wikipedia"),
    ("https://www.paypal.com/myaccount/summary", "PayPal"),
    ("https://www.google.com/search?q=tab+hoarding", "tab hoarding - Google Search"),
    ("https://example.org/", "Example Domain"),
    ("https://blog.example.net/post/42", "A personal blog post"),
];

/// Generates synthetic test data files into `output_dir`.
pub fn command_generate_testdata(output_dir: PathBuf, tab_count: usize, duplicate_ratio: f64) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&duplicate_ratio) {
        bail!("duplicate_ratio must be within 0.0-1.0, got {}", duplicate_ratio);
    }

    debug!(
        "Generating test data: tabs={}, duplicate_ratio={}, output={}",
        tab_count,
        duplicate_ratio,
        output_dir.display()
    );

    let mut rng = rand::thread_rng();
    let now = now_ms();

    let tabs = generate_tabs(&mut rng, tab_count, duplicate_ratio);
    let access_times = generate_access_times(&mut rng, &tabs, now);
    let snapshot = generate_snapshot(&mut rng, &tabs, now);

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    write_json(&output_dir.join("tabs.json"), &tabs)?;
    write_json(&output_dir.join("access_times.json"), &access_times)?;
    write_json(&output_dir.join("snapshot.json"), &snapshot)?;

    info!(
        "Generated {} tabs and {} resource samples in {}",
        tabs.len(),
        snapshot.tab_resources.len(),
        output_dir.display()
    );
    println!("✅ Test data written to: {}", output_dir.display());
    println!("   ├─ tabs.json");
    println!("   ├─ access_times.json");
    println!("   └─ snapshot.json");

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn generate_tabs<R: Rng>(rng: &mut R, count: usize, duplicate_ratio: f64) -> Vec<Tab> {
    let mut tabs: Vec<Tab> = Vec::with_capacity(count);

    for i in 0..count {
        let id = 100 + i as i64;
        let mut tab = match tabs.choose(rng) {
            Some(earlier) if rng.gen_bool(duplicate_ratio) => {
                // Same page, sometimes with a trailing slash or query noise.
                let url = match rng.gen_range(0..3) {
                    0 => earlier.url.clone(),
                    1 => format!("{}/", earlier.url.trim_end_matches('/')),
                    _ => format!("{}#section", earlier.url),
                };
                Tab::new(id, url, earlier.title.clone())
            }
            _ => {
                let (url, title) = SITES[rng.gen_range(0..SITES.len())];
                Tab::new(id, url, title)
            }
        };

        tab.window_id = 1 + rng.gen_range(0..2);
        tab.discarded = rng.gen_bool(0.25);
        tabs.push(tab);
    }

    if let Some(first) = tabs.first_mut() {
        first.active = true;
        first.discarded = false;
    }

    tabs
}

fn generate_access_times<R: Rng>(rng: &mut R, tabs: &[Tab], now: i64) -> AccessTimes {
    tabs.iter()
        .map(|t| (t.id, now - rng.gen_range(0..MAX_IDLE_DAYS * DAY_MS)))
        .collect()
}

fn generate_snapshot<R: Rng>(rng: &mut R, tabs: &[Tab], now: i64) -> ResourceSnapshot {
    let mut tab_resources = BTreeMap::new();

    for tab in tabs.iter().filter(|t| t.is_loaded()) {
        let precise = rng.gen_bool(0.2);
        let estimate = rng.gen_range(40.0..600.0_f64).round();
        let cpu_estimate = rng.gen_range(0.0..15.0_f64);

        tab_resources.insert(
            tab.id,
            ResourceSample {
                tab_id: tab.id,
                mode: if precise { MeasurementMode::Precise } else { MeasurementMode::Heuristic },
                memory_mb: if precise { (estimate * rng.gen_range(0.8..1.2)).round() } else { 0.0 },
                memory_estimate_mb: estimate,
                cpu_percent: if precise { cpu_estimate * rng.gen_range(0.8..1.2) } else { 0.0 },
                cpu_estimate_percent: cpu_estimate,
                timestamp_ms: now,
            },
        );
    }

    let used_percent = rng.gen_range(35.0..90.0_f64).round();
    ResourceSnapshot {
        tab_resources,
        system_resources: SystemSnapshot {
            total_memory_mb: SYSTEM_MEMORY_MB,
            used_percent,
            available_mb: (SYSTEM_MEMORY_MB * (100.0 - used_percent) / 100.0).round(),
        },
        last_update_ms: now,
        scan_count: 1,
    }
}

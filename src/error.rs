//! Error type shared by the library.
//!
//! Analysis itself never fails on partial data; these errors cover input
//! documents that violate their basic shape and configuration tables that
//! cannot be loaded.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid pattern '{pattern}' in category '{category}': {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate category rule '{0}'")]
    DuplicateRule(String),

    #[error("Chaos level table is empty")]
    EmptyChaosTable,

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource snapshot unavailable after {attempts} attempt(s): {reason}")]
    SnapshotUnavailable { attempts: u32, reason: String },
}

impl AnalyzerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

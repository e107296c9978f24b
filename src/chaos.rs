//! Chaos levels: discrete severity tiers derived from the open-tab count.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::AnalyzerError;

/// A severity tier covering an inclusive range of tab counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosLevel {
    pub name: String,
    pub min: u64,
    /// Inclusive upper bound; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    pub message: String,
    pub color: String,
    /// Gauge fill for display, 0-100.
    pub percentage: u8,
}

impl ChaosLevel {
    pub fn contains(&self, count: u64) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

#[derive(Debug, Deserialize)]
struct LevelsFile {
    levels: Vec<ChaosLevel>,
}

/// Ordered chaos level table. Never empty.
#[derive(Debug, Clone)]
pub struct ChaosLevelTable {
    levels: Vec<ChaosLevel>,
}

static BUILTIN_LEVELS: Lazy<ChaosLevelTable> = Lazy::new(|| {
    ChaosLevelTable::from_toml_str(include_str!("../data/chaos_levels.toml"))
        .unwrap_or_else(|e| panic!("built-in chaos level table is invalid: {e}"))
});

impl ChaosLevelTable {
    /// Builds a table. Gaps and overlaps are tolerated (and logged); only an
    /// empty table is rejected.
    pub fn new(mut levels: Vec<ChaosLevel>) -> Result<Self, AnalyzerError> {
        if levels.is_empty() {
            return Err(AnalyzerError::EmptyChaosTable);
        }
        for level in &mut levels {
            level.percentage = level.percentage.min(100);
        }
        let table = Self { levels };
        for problem in table.validate() {
            warn!("Chaos level table: {}", problem);
        }
        Ok(table)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AnalyzerError> {
        let parsed: LevelsFile = toml::from_str(content)?;
        Self::new(parsed.levels)
    }

    pub fn from_file(path: &Path) -> Result<Self, AnalyzerError> {
        let content = fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        let table = Self::from_toml_str(&content)?;
        info!("Loaded {} chaos levels from {}", table.levels.len(), path.display());
        Ok(table)
    }

    pub fn builtin() -> Self {
        BUILTIN_LEVELS.clone()
    }

    pub fn levels(&self) -> &[ChaosLevel] {
        &self.levels
    }

    /// Returns the first level whose range contains `count`, falling back to
    /// the last (most severe) level when none does.
    pub fn level_for(&self, count: u64) -> &ChaosLevel {
        self.levels
            .iter()
            .find(|l| l.contains(count))
            .unwrap_or_else(|| &self.levels[self.levels.len() - 1])
    }

    /// Describes coverage problems: gaps, overlaps, inverted ranges and a
    /// bounded final level. An empty result means the ranges partition the
    /// non-negative integers.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut expected_min = 0u64;

        for (i, level) in self.levels.iter().enumerate() {
            if let Some(max) = level.max {
                if max < level.min {
                    problems.push(format!(
                        "level '{}' has max {} below min {}",
                        level.name, max, level.min
                    ));
                }
            }
            if level.min > expected_min {
                problems.push(format!(
                    "gap before level '{}': counts {}..={} are not covered",
                    level.name,
                    expected_min,
                    level.min - 1
                ));
            } else if level.min < expected_min {
                problems.push(format!(
                    "level '{}' overlaps the previous level at {}",
                    level.name, level.min
                ));
            }

            match level.max {
                Some(max) => expected_min = max.saturating_add(1),
                None if i + 1 < self.levels.len() => {
                    problems.push(format!(
                        "level '{}' is unbounded but is not the last level",
                        level.name
                    ));
                    expected_min = u64::MAX;
                }
                None => {}
            }
        }

        if let Some(last) = self.levels.last() {
            if let Some(max) = last.max {
                problems.push(format!(
                    "last level '{}' is bounded at {}; larger counts fall back to it",
                    last.name, max
                ));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(name: &str, min: u64, max: Option<u64>) -> ChaosLevel {
        ChaosLevel {
            name: name.to_string(),
            min,
            max,
            message: String::new(),
            color: String::new(),
            percentage: 50,
        }
    }

    #[test]
    fn test_builtin_boundaries() {
        let table = ChaosLevelTable::builtin();
        assert_eq!(table.level_for(0).name, "excellent");
        assert_eq!(table.level_for(10).name, "excellent");
        assert_eq!(table.level_for(11).name, "good");
        assert_eq!(table.level_for(50).name, "chaotic");
        assert_eq!(table.level_for(51).name, "apocalyptic");
        assert_eq!(table.level_for(10_000).name, "apocalyptic");
    }

    #[test]
    fn test_builtin_is_valid() {
        assert!(ChaosLevelTable::builtin().validate().is_empty());
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            ChaosLevelTable::new(vec![]),
            Err(AnalyzerError::EmptyChaosTable)
        ));
    }

    #[test]
    fn test_gap_falls_back_to_most_severe() {
        let table =
            ChaosLevelTable::new(vec![level("low", 0, Some(5)), level("high", 10, Some(20))])
                .unwrap();
        assert_eq!(table.level_for(7).name, "high");
        assert_eq!(table.level_for(99).name, "high");

        let problems = table.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("gap"));
        assert!(problems[1].contains("bounded"));
    }

    #[test]
    fn test_overlap_first_match_wins() {
        let table =
            ChaosLevelTable::new(vec![level("a", 0, Some(10)), level("b", 5, None)]).unwrap();
        assert_eq!(table.level_for(7).name, "a");
        assert!(table.validate()[0].contains("overlaps"));
    }

    #[test]
    fn test_percentage_clamped() {
        let mut l = level("x", 0, None);
        l.percentage = 250;
        let table = ChaosLevelTable::new(vec![l]).unwrap();
        assert_eq!(table.levels()[0].percentage, 100);
    }
}

//! Category rule table.
//!
//! Rules are loaded from TOML (the built-in table is embedded from
//! `data/categories.toml`) and compiled once. Table order is the
//! classification priority: the first rule that matches a tab wins.

use ahash::AHashSet as HashSet;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::AnalyzerError;

/// Category name used when no rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Raw rule definition as it appears in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRuleDef {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Root structure for a rules file.
#[derive(Debug, Deserialize)]
struct RulesFile {
    categories: Vec<CategoryRuleDef>,
}

/// A compiled category rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Lowercased keywords, in declared order.
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
}

impl CategoryRule {
    /// Compiles a rule definition. Keywords are lowercased and deduplicated,
    /// patterns are compiled case-insensitively.
    pub fn compile(def: CategoryRuleDef) -> Result<Self, AnalyzerError> {
        let mut seen = HashSet::new();
        let keywords = def
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        let mut patterns = Vec::with_capacity(def.patterns.len());
        for p in &def.patterns {
            let re = RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| AnalyzerError::InvalidPattern {
                    category: def.name.clone(),
                    pattern: p.clone(),
                    source,
                })?;
            patterns.push(re);
        }

        Ok(Self {
            name: def.name,
            icon: def.icon,
            color: def.color,
            keywords,
            patterns,
        })
    }

    /// True if any keyword or pattern matches the url or title.
    ///
    /// `url_lower` and `title_lower` must already be lowercased.
    pub(crate) fn matches(&self, url: &str, title: &str, url_lower: &str, title_lower: &str) -> bool {
        let keyword_hit = self
            .keywords
            .iter()
            .any(|k| url_lower.contains(k.as_str()) || title_lower.contains(k.as_str()));
        keyword_hit || self.patterns.iter().any(|re| re.is_match(url) || re.is_match(title))
    }
}

/// Ordered, immutable set of category rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

static BUILTIN_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_toml_str(include_str!("../data/categories.toml"))
        .unwrap_or_else(|e| panic!("built-in category table is invalid: {e}"))
});

impl RuleTable {
    /// Builds a table from definitions, rejecting duplicate names and
    /// invalid patterns.
    pub fn from_defs(defs: Vec<CategoryRuleDef>) -> Result<Self, AnalyzerError> {
        let mut names = HashSet::new();
        let mut rules = Vec::with_capacity(defs.len());
        for def in defs {
            if !names.insert(def.name.clone()) {
                return Err(AnalyzerError::DuplicateRule(def.name));
            }
            rules.push(CategoryRule::compile(def)?);
        }
        debug!("Compiled {} category rules", rules.len());
        Ok(Self { rules })
    }

    /// Parses a `[[categories]]` TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, AnalyzerError> {
        let parsed: RulesFile = toml::from_str(content)?;
        Self::from_defs(parsed.categories)
    }

    /// Loads a rules file from disk.
    pub fn from_file(path: &Path) -> Result<Self, AnalyzerError> {
        let content = fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        let table = Self::from_toml_str(&content)?;
        info!("Loaded {} category rules from {}", table.len(), path.display());
        Ok(table)
    }

    /// The embedded default table.
    pub fn builtin() -> Self {
        BUILTIN_RULES.clone()
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a rule by category name.
    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Position of a category in priority order; `Uncategorized` and unknown
    /// names sort after every rule.
    pub fn rank(&self, name: &str) -> usize {
        self.rules
            .iter()
            .position(|r| r.name == name)
            .unwrap_or(self.rules.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, keywords: &[&str], patterns: &[&str]) -> CategoryRuleDef {
        CategoryRuleDef {
            name: name.to_string(),
            icon: String::new(),
            color: String::new(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_builtin_table_loads() {
        let table = RuleTable::builtin();
        assert!(!table.is_empty());
        assert_eq!(table.rules()[0].name, "Social");
        assert!(table.get("Development").is_some());
    }

    #[test]
    fn test_keywords_are_normalized() {
        let rule = CategoryRule::compile(def("A", &[" GitHub ", "github", ""], &[])).unwrap();
        assert_eq!(rule.keywords, vec!["github".to_string()]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = RuleTable::from_defs(vec![def("Broken", &[], &["(unclosed"])]).unwrap_err();
        match err {
            AnalyzerError::InvalidPattern { category, pattern, .. } => {
                assert_eq!(category, "Broken");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_rule_names_rejected() {
        let err = RuleTable::from_defs(vec![def("A", &["a"], &[]), def("A", &["b"], &[])])
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::DuplicateRule(name) if name == "A"));
    }

    #[test]
    fn test_rank_orders_uncategorized_last() {
        let table =
            RuleTable::from_defs(vec![def("A", &["a"], &[]), def("B", &["b"], &[])]).unwrap();
        assert_eq!(table.rank("A"), 0);
        assert_eq!(table.rank("B"), 1);
        assert_eq!(table.rank(UNCATEGORIZED), 2);
    }

    #[test]
    fn test_from_toml_str() {
        let table = RuleTable::from_toml_str(
            r#"
            [[categories]]
            name = "Docs"
            keywords = ["readme"]
            patterns = ['\.md$']
            "#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rules()[0].patterns.len(), 1);
    }
}

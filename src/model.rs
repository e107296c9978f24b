//! Tab records exchanged with the platform collaborator.
//!
//! Tabs are read-only input: the analyzer never mutates them and only attaches
//! derived fields (category, duplicate flag) when producing output.

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

/// Platform-assigned tab identifier.
pub type TabId = i64;

/// Loading state reported by the platform for a tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single open browser tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub window_id: i64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub discarded: bool,
    #[serde(default)]
    pub status: TabStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "favIconUrl")]
    pub favicon: Option<String>,
}

/// Platforms report `null` for the url and title of some internal pages.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Tab {
    /// Convenience constructor used by tests and synthetic data.
    pub fn new(id: TabId, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: title.into(),
            status: TabStatus::Complete,
            ..Self::default()
        }
    }

    /// A tab counts as loaded while the platform keeps it in memory.
    pub fn is_loaded(&self) -> bool {
        !self.discarded
    }
}

/// A tab annotated with its category and duplicate flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedTab {
    #[serde(flatten)]
    pub tab: Tab,
    pub category: String,
    pub is_duplicate: bool,
}

/// Parses a JSON tab list.
///
/// The document must be a JSON array; anything else violates the input
/// contract and is reported as [`AnalyzerError::InvalidInput`]. Individual
/// entries only need an `id`, every other field falls back to its default.
pub fn parse_tab_list(json: &str) -> Result<Vec<Tab>, AnalyzerError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(AnalyzerError::InvalidInput(format!(
            "expected a JSON array of tabs, found {}",
            json_kind(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Fraction of tabs that are loaded, `0.0` for an empty list.
pub fn loaded_ratio(tabs: &[Tab]) -> f64 {
    if tabs.is_empty() {
        return 0.0;
    }
    let loaded = tabs.iter().filter(|t| t.is_loaded()).count();
    loaded as f64 / tabs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tab_list_minimal_entries() {
        let tabs = parse_tab_list(r#"[{"id": 1}, {"id": 2, "url": "https://a.com", "windowId": 3}]"#)
            .expect("valid tab list");
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].url, "");
        assert_eq!(tabs[0].status, TabStatus::Unknown);
        assert_eq!(tabs[1].window_id, 3);
    }

    #[test]
    fn test_null_url_and_title_read_as_empty() {
        use crate::classifier::classify;
        use crate::rules::{RuleTable, UNCATEGORIZED};

        let tabs = parse_tab_list(
            r#"[{"id":1,"url":null,"title":null},{"id":2,"url":"https://github.com/","title":"GitHub"}]"#,
        )
        .expect("null url and title are accepted");
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].url, "");
        assert_eq!(tabs[0].title, "");
        assert_eq!(classify(&tabs[0], &RuleTable::builtin()), UNCATEGORIZED);
        assert_eq!(tabs[1].title, "GitHub");
    }

    #[test]
    fn test_parse_tab_list_rejects_object() {
        let err = parse_tab_list(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let tabs = parse_tab_list(r#"[{"id": 1, "status": "unloaded"}]"#).unwrap();
        assert_eq!(tabs[0].status, TabStatus::Unknown);
    }

    #[test]
    fn test_favicon_alias() {
        let tabs = parse_tab_list(r#"[{"id": 1, "favIconUrl": "https://a.com/f.ico"}]"#).unwrap();
        assert_eq!(tabs[0].favicon.as_deref(), Some("https://a.com/f.ico"));
    }

    #[test]
    fn test_loaded_ratio() {
        assert_eq!(loaded_ratio(&[]), 0.0);

        let mut discarded = Tab::new(2, "https://b.com", "b");
        discarded.discarded = true;
        let tabs = vec![Tab::new(1, "https://a.com", "a"), discarded];
        assert_eq!(loaded_ratio(&tabs), 0.5);
    }
}

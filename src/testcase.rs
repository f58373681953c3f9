//! Corpus data model shared by the optimizer checks.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority assigned to a test case in the management system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
        }
    }

    /// Parse a priority value as it appears in artifact metadata
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "CRITICAL" => Some(Priority::Critical),
            "HIGH" => Some(Priority::High),
            "NORMAL" => Some(Priority::Normal),
            "LOW" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One managed test case as supplied by the caller.
///
/// Immutable within a single analysis pass; the optimizer clones cases when
/// it builds the pruned subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    pub priority: Priority,
    /// Ordered step descriptions
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Set by the optimizer when it rewrites a case (e.g. step truncation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_note: Option<String>,
}

impl TestCase {
    /// Title and description lower-cased and joined, for keyword scans
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        if let Some(desc) = &self.description {
            text.push(' ');
            text.push_str(&desc.to_lowercase());
        }
        text
    }
}

/// Parse a corpus from a JSON array, as delivered by the storage layer
pub fn parse_corpus(json: &str) -> anyhow::Result<Vec<TestCase>> {
    serde_json::from_str(json).context("corpus is not a JSON array of test cases")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("critical"), Some(Priority::Critical));
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("B+"), None);
        assert_eq!(Priority::parse(""), None);
    }

    #[test]
    fn test_priority_serde_uppercase() {
        let json = serde_json::to_string(&Priority::Normal).unwrap();
        assert_eq!(json, "\"NORMAL\"");
        let back: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(back, Priority::Low);
    }

    #[test]
    fn test_parse_corpus_roundtrip() {
        let json = r#"[
            {
                "id": "tc_001",
                "title": "Open the calculator page",
                "feature": "Main Page",
                "priority": "CRITICAL",
                "steps": ["Open the page", "Wait for the load", "Check the header"],
                "expected_result": "The page loads",
                "updated_at": "2024-06-15T10:30:00Z"
            }
        ]"#;
        let corpus = parse_corpus(json).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].id, "tc_001");
        assert_eq!(corpus[0].priority, Priority::Critical);
        assert_eq!(corpus[0].steps.len(), 3);
        assert!(corpus[0].optimization_note.is_none());
    }

    #[test]
    fn test_parse_corpus_rejects_non_array() {
        assert!(parse_corpus("{}").is_err());
        assert!(parse_corpus("not json").is_err());
    }

    #[test]
    fn test_searchable_text_includes_description() {
        let tc = TestCase {
            id: "tc_1".into(),
            title: "Checkout Flow".into(),
            feature: "Cart".into(),
            story: None,
            priority: Priority::Normal,
            steps: vec![],
            expected_result: String::new(),
            description: Some("Legacy API".into()),
            updated_at: Utc::now(),
            optimization_note: None,
        };
        assert_eq!(tc.searchable_text(), "checkout flow legacy api");
    }
}

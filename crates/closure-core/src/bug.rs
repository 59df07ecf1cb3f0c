use crate::jira::Issue;
use serde::{Deserialize, Serialize};

/// Row of the found-bugs table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default, alias = "isLegacy")]
    pub legacy: bool,
    #[serde(default)]
    pub priority: String,
}

impl Bug {
    /// Severity comes from `severity_field` when it holds text, otherwise
    /// from the first label mentioning "severity" (kept verbatim).
    pub fn from_issue(issue: &Issue, severity_field: &str) -> Self {
        let labels = &issue.fields.labels;
        let severity = issue
            .custom_text(severity_field)
            .or_else(|| {
                labels
                    .iter()
                    .find(|l| l.to_lowercase().contains("severity"))
                    .cloned()
            })
            .unwrap_or_default();
        let legacy = labels.iter().any(|l| l.to_lowercase().contains("legacy"));

        Self {
            key: issue.key.clone(),
            title: issue.summary().to_string(),
            status: issue.status_name().to_string(),
            severity,
            legacy,
            priority: issue.priority_name().to_string(),
        }
    }
}

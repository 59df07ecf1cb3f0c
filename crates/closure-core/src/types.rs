use crate::jira::Issue;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// Flattened view of a tracker issue, as the UI and mailer see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    /// Assignee display name.
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub assignee_email: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub fix_versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Ticket {
    pub fn from_issue(issue: &Issue) -> Self {
        let f = &issue.fields;
        let assignee = f.assignee.as_ref();
        Self {
            key: issue.key.clone(),
            summary: issue.summary().to_string(),
            assignee: assignee.and_then(|a| a.display_name.clone()),
            assignee_email: assignee.and_then(|a| a.email_address.clone()),
            status: issue.status_name().to_string(),
            labels: f.labels.clone(),
            components: f.components.iter().map(|c| c.name.clone()).collect(),
            fix_versions: f.fix_versions.iter().map(|v| v.name.clone()).collect(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    /// Assignee name, treating the tracker's "Unassigned" placeholder as none.
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != "Unassigned")
    }
}

// ---------------------------------------------------------------------------
// ReleaseContext
// ---------------------------------------------------------------------------

/// Filter parameters chosen on the home form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseContext {
    #[serde(default)]
    pub release_version: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub component: String,
}

// ---------------------------------------------------------------------------
// EmailJob
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

// ---------------------------------------------------------------------------
// SendResult / SendSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Sent,
    Error,
    Skipped,
}

impl SendStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SendStatus::Sent => "sent",
            SendStatus::Error => "error",
            SendStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub recipient_key: String,
    pub status: SendStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SendResult {
    pub fn sent(key: &str, to: &str) -> Self {
        Self {
            recipient_key: key.to_string(),
            status: SendStatus::Sent,
            to: Some(to.to_string()),
            error: None,
            reason: None,
        }
    }

    pub fn failed(key: &str, error: impl Into<String>) -> Self {
        Self {
            recipient_key: key.to_string(),
            status: SendStatus::Error,
            to: None,
            error: Some(error.into()),
            reason: None,
        }
    }

    pub fn skipped(key: &str, reason: impl Into<String>) -> Self {
        Self {
            recipient_key: key.to_string(),
            status: SendStatus::Skipped,
            to: None,
            error: None,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSummary {
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl SendSummary {
    pub fn of(results: &[SendResult]) -> Self {
        let count = |s: SendStatus| results.iter().filter(|r| r.status == s).count();
        Self {
            total: results.len(),
            sent: count(SendStatus::Sent),
            skipped: count(SendStatus::Skipped),
            errors: count(SendStatus::Error),
        }
    }
}

/// Outcome of a multi-recipient send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<SendResult>,
    pub summary: SendSummary,
}

impl BatchReport {
    pub fn new(results: Vec<SendResult>) -> Self {
        let summary = SendSummary::of(&results);
        Self { results, summary }
    }

    pub fn message(&self) -> String {
        format!(
            "Sent {} of {} notifications ({} skipped, {} failed)",
            self.summary.sent, self.summary.total, self.summary.skipped, self.summary.errors
        )
    }
}

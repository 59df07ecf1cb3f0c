//! Status bucketing and previous-release triage over tracker issues.
//!
//! Every function here borrows its input and returns fresh collections;
//! bucket contents keep the source order.

use crate::jira::Issue;
use crate::jql::STATUS_DEV_RELEASED;
use crate::types::Ticket;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StatusBucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusBucket {
    Open,
    InProgress,
    InDevelopment,
    QaCompleted,
    InQa,
}

/// Substring rules in precedence order; the first match wins.
const BUCKET_RULES: &[(&str, StatusBucket)] = &[
    ("open", StatusBucket::Open),
    ("progress", StatusBucket::InProgress),
    ("development", StatusBucket::InDevelopment),
    ("qa completed", StatusBucket::QaCompleted),
    ("qa", StatusBucket::InQa),
];

/// Bucket for a status name, or `None` when no rule matches.
pub fn bucket_for(status: &str) -> Option<StatusBucket> {
    let status = status.to_lowercase();
    BUCKET_RULES
        .iter()
        .find(|(needle, _)| status.contains(needle))
        .map(|(_, bucket)| *bucket)
}

// ---------------------------------------------------------------------------
// StatusSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub open: usize,
    pub in_progress: usize,
    pub in_development: usize,
    #[serde(rename = "inQA")]
    pub in_qa: usize,
    pub qa_completed: usize,
    /// Bug-type issues, counted independently of their status bucket.
    pub reported_bugs: usize,
}

pub fn status_summary(issues: &[Issue]) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for issue in issues {
        match bucket_for(issue.status_name()) {
            Some(StatusBucket::Open) => summary.open += 1,
            Some(StatusBucket::InProgress) => summary.in_progress += 1,
            Some(StatusBucket::InDevelopment) => summary.in_development += 1,
            Some(StatusBucket::QaCompleted) => summary.qa_completed += 1,
            Some(StatusBucket::InQa) => summary.in_qa += 1,
            None => {}
        }
        if issue.issue_type_name().to_lowercase().contains("bug") {
            summary.reported_bugs += 1;
        }
    }
    summary
}

// ---------------------------------------------------------------------------
// StatusCounts (exact status names)
// ---------------------------------------------------------------------------

pub const STATUS_CATEGORIES: [&str; 6] = [
    "Open",
    "In Progress",
    "In Development",
    "In QA",
    "QA Completed",
    "Reported Bugs",
];

/// Counts keyed by the exact workflow status names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "Open")]
    pub open: usize,
    #[serde(rename = "In Progress")]
    pub in_progress: usize,
    #[serde(rename = "In Development")]
    pub in_development: usize,
    #[serde(rename = "In QA")]
    pub in_qa: usize,
    #[serde(rename = "QA Completed")]
    pub qa_completed: usize,
    #[serde(rename = "Reported Bugs")]
    pub reported_bugs: usize,
}

impl StatusCounts {
    fn slot(&mut self, status: &str) -> Option<&mut usize> {
        match status {
            "Open" => Some(&mut self.open),
            "In Progress" => Some(&mut self.in_progress),
            "In Development" => Some(&mut self.in_development),
            "In QA" => Some(&mut self.in_qa),
            "QA Completed" => Some(&mut self.qa_completed),
            "Reported Bugs" => Some(&mut self.reported_bugs),
            _ => None,
        }
    }
}

pub fn status_counts(issues: &[Issue]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for issue in issues {
        if let Some(n) = counts.slot(issue.status_name()) {
            *n += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Fix-version filter
// ---------------------------------------------------------------------------

/// Tickets not yet attached to any fix version.
pub fn missing_fix_version(tickets: &[Ticket]) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|t| t.fix_versions.is_empty())
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Previous-release triage
// ---------------------------------------------------------------------------

pub const STATUS_PRIORITIZED_BUGS: &str = "Prioritized Bugs";
pub const STATUS_REDEVELOPMENT_BUGS: &str = "Redevelopment Bugs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageMode {
    /// Priority name contains "high", any label contains "redevelopment",
    /// status equals "Dev Released" ignoring case. Buckets overlap.
    Substring,
    /// Status equals "Prioritized Bugs", "Redevelopment Bugs" or
    /// "Dev Released" exactly. Buckets are exclusive.
    ExactStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Triage<T> {
    pub prioritized: Vec<T>,
    pub redevelopment: Vec<T>,
    pub dev_released: Vec<T>,
}

impl<T> Default for Triage<T> {
    fn default() -> Self {
        Self {
            prioritized: Vec::new(),
            redevelopment: Vec::new(),
            dev_released: Vec::new(),
        }
    }
}

impl<T> Triage<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Triage<U> {
        Triage {
            prioritized: self.prioritized.into_iter().map(&mut f).collect(),
            redevelopment: self.redevelopment.into_iter().map(&mut f).collect(),
            dev_released: self.dev_released.into_iter().map(&mut f).collect(),
        }
    }
}

pub fn triage(mode: TriageMode, issues: &[Issue]) -> Triage<&Issue> {
    let mut out = Triage::default();
    for issue in issues {
        let status = issue.status_name();
        match mode {
            TriageMode::Substring => {
                if issue.priority_name().to_lowercase().contains("high") {
                    out.prioritized.push(issue);
                }
                if issue
                    .fields
                    .labels
                    .iter()
                    .any(|l| l.to_lowercase().contains("redevelopment"))
                {
                    out.redevelopment.push(issue);
                }
                if status.eq_ignore_ascii_case(STATUS_DEV_RELEASED) {
                    out.dev_released.push(issue);
                }
            }
            TriageMode::ExactStatus => match status {
                STATUS_PRIORITIZED_BUGS => out.prioritized.push(issue),
                STATUS_REDEVELOPMENT_BUGS => out.redevelopment.push(issue),
                STATUS_DEV_RELEASED => out.dev_released.push(issue),
                _ => {}
            },
        }
    }
    out
}

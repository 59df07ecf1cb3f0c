use axum::extract::State;
use axum::Json;
use closure_core::bug::Bug;
use closure_core::classify::{self, TriageMode};
use closure_core::jira::{Issue, JiraClient, PAGE_SIZE};
use closure_core::jql::shapes;
use closure_core::labels;
use closure_core::types::ReleaseContext;
use serde::Serialize;

use super::{parse, required, Body};
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/jira/found-bugs: bugs under the label, optionally narrowed to a component.
pub async fn found_bugs(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required label")?;
    let label = required(&body.label, "Missing required label")?;
    let component = Some(body.component.trim()).filter(|c| !c.is_empty());

    let severity_field = app.settings.severity_field.as_str();
    let jql = shapes::bugs(jira.project_key(), label, component);
    let page = jira
        .search(
            &jql,
            &["summary", "status", "priority", "labels", severity_field],
            PAGE_SIZE,
        )
        .await?;
    let bugs: Vec<Bug> = page
        .issues
        .iter()
        .map(|issue| Bug::from_issue(issue, severity_field))
        .collect();

    Ok(Json(serde_json::json!({ "bugs": bugs })))
}

// ---------------------------------------------------------------------------
// Previous-release triage
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousBugsBody {
    #[serde(default)]
    current_label: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    component: String,
}

#[derive(Debug, Serialize)]
struct TriagedBug {
    key: String,
    summary: String,
    url: String,
    status: String,
    priority: String,
    labels: Vec<String>,
}

impl TriagedBug {
    fn new(jira: &JiraClient, issue: &Issue) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.summary().to_string(),
            url: jira.browse_url(&issue.key),
            status: issue.status_name().to_string(),
            priority: issue.priority_name().to_string(),
            labels: issue.fields.labels.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CohortEntry {
    key: String,
    title: String,
    url: String,
}

/// POST /api/jira/previous-bugs: previous sprint's bugs, triaged by
/// priority, redevelopment label and Dev Released status. Buckets may overlap.
pub async fn previous_bugs(
    State(app): State<AppState>,
    body: Body<PreviousBugsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let current = body.current_label.or(body.label).unwrap_or_default();
    let current = required(&current, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;
    let previous = labels::previous_label(current)?;

    let jql = shapes::previous_bugs(jira.project_key(), &previous, component);
    let page = jira
        .search(&jql, &["summary", "status", "priority", "labels"], PAGE_SIZE)
        .await?;
    let triage = classify::triage(TriageMode::Substring, &page.issues)
        .map(|issue| TriagedBug::new(jira, issue));

    Ok(Json(serde_json::json!({
        "previousLabel": previous,
        "prioritized": triage.prioritized,
        "redevelopment": triage.redevelopment,
        "devReleased": triage.dev_released,
    })))
}

/// POST /api/previous-bugs-summary: previous sprint's cohort split by exact workflow status.
pub async fn previous_bugs_summary(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing label or component")?;
    let label = required(&body.label, "Missing label or component")?;
    let component = required(&body.component, "Missing label or component")?;
    let previous = labels::previous_label(label)?;

    let jql = shapes::label_component(jira.project_key(), &previous, component);
    let page = jira.search(&jql, &["summary", "status"], PAGE_SIZE).await?;
    let triage =
        classify::triage(TriageMode::ExactStatus, &page.issues).map(|issue| CohortEntry {
            key: issue.key.clone(),
            title: issue.summary().to_string(),
            url: jira.browse_url(&issue.key),
        });

    Ok(Json(serde_json::json!({
        "previousLabel": previous,
        "prioritized": triage.prioritized,
        "redevelopment": triage.redevelopment,
        "devReleased": triage.dev_released,
    })))
}

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use closure_core::jira::{Issue, PAGE_SIZE};
use closure_core::jql::shapes;
use closure_core::labels::release_label;
use closure_core::types::ReleaseContext;

use super::{parse, required, Body, TICKET_FIELDS};
use crate::error::AppError;
use crate::state::AppState;

const DEBUG_SAMPLE_SIZE: u32 = 10;

fn component_names(issue: &Issue) -> Vec<String> {
    issue.fields.components.iter().map(|c| c.name.clone()).collect()
}

/// GET /api/jira/debug: statuses, labels and components seen on the newest issues.
pub async fn debug_sample(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let page = jira
        .search(
            &shapes::recent(jira.project_key()),
            &["summary", "status", "labels", "components"],
            DEBUG_SAMPLE_SIZE,
        )
        .await?;

    let mut statuses = BTreeSet::new();
    let mut labels = BTreeSet::new();
    let mut components = BTreeSet::new();
    let mut samples = Vec::with_capacity(page.issues.len());
    for issue in &page.issues {
        statuses.insert(issue.status_name().to_string());
        labels.extend(issue.fields.labels.iter().cloned());
        components.extend(component_names(issue));
        samples.push(serde_json::json!({
            "key": issue.key,
            "summary": issue.summary(),
            "status": issue.status_name(),
            "labels": issue.fields.labels,
            "components": component_names(issue),
        }));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "totalIssues": page.total,
        "sampleIssues": page.issues.len(),
        "statuses": statuses,
        "labels": labels,
        "components": components,
        "sampleTickets": samples,
    })))
}

/// POST /api/jira/test-jql: run the open-release query and report paging metadata.
pub async fn test_jql(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let label = required(&body.label, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;

    let jql = shapes::open_release(jira.project_key(), label, component);
    let page = jira.search(&jql, TICKET_FIELDS, PAGE_SIZE).await?;
    let sample = page.issues.first().map(|issue| {
        serde_json::json!({
            "key": issue.key,
            "summary": issue.summary(),
            "status": issue.status_name(),
            "labels": issue.fields.labels,
            "components": component_names(issue),
            "fixVersions": issue.fields.fix_versions.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        })
    });

    Ok(Json(serde_json::json!({
        "success": true,
        "jql": jql.render(),
        "formattedLabel": release_label(label),
        "total": page.total,
        "maxResults": page.max_results,
        "startAt": page.start_at,
        "issues": page.issues.len(),
        "sampleIssue": sample,
    })))
}

use axum::extract::State;
use axum::Json;
use closure_core::classify;
use closure_core::jira::{JiraClient, SearchPage, PAGE_SIZE};
use closure_core::jql::shapes;
use closure_core::types::{ReleaseContext, Ticket};

use super::{parse, required, Body, TICKET_FIELDS};
use crate::error::AppError;
use crate::state::AppState;

fn tickets_of(jira: &JiraClient, page: &SearchPage) -> Vec<Ticket> {
    page.issues
        .iter()
        .map(|issue| Ticket::from_issue(issue).with_url(jira.browse_url(&issue.key)))
        .collect()
}

/// POST /api/jira/filter-tickets: Open tickets carrying the `-release` label.
pub async fn filter_tickets(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let label = required(&body.label, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;

    let jql = shapes::open_release(jira.project_key(), label, component);
    let page = jira.search(&jql, TICKET_FIELDS, PAGE_SIZE).await?;

    Ok(Json(serde_json::json!({
        "tickets": tickets_of(jira, &page),
        "totalCount": page.total,
    })))
}

/// POST /api/filter-dev-released-tickets: Dev Released tickets with no fix version.
pub async fn filter_dev_released(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing label or component")?;
    let label = required(&body.label, "Missing label or component")?;
    let component = required(&body.component, "Missing label or component")?;

    let jql = shapes::dev_released_unversioned(jira.project_key(), label, component);
    let page = jira.search(&jql, TICKET_FIELDS, PAGE_SIZE).await?;
    let tickets = classify::missing_fix_version(&tickets_of(jira, &page));

    Ok(Json(serde_json::json!({ "tickets": tickets })))
}

/// POST /api/jira/release-version-missing: Dev Released issues whose
/// "Release Version" field is blank, returned as raw tracker issues.
pub async fn release_version_missing(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let label = required(&body.label, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;

    let jql = shapes::dev_released_missing_release_field(jira.project_key(), label, component);
    let mut fields = TICKET_FIELDS.to_vec();
    fields.push(app.settings.severity_field.as_str());
    let page = jira.search(&jql, &fields, PAGE_SIZE).await?;

    Ok(Json(serde_json::json!({ "issues": page.issues })))
}

use axum::extract::State;
use axum::Json;
use closure_core::classify;
use closure_core::jira::PAGE_SIZE;
use closure_core::jql::shapes;
use closure_core::tested_area::tested_area;
use closure_core::types::ReleaseContext;

use super::{parse, required, Body};
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/jira/summary: bucketed status summary for the label and component.
pub async fn status_summary(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let label = required(&body.label, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;

    let jql = shapes::label_component(jira.project_key(), label, component);
    let page = jira.search(&jql, &["status", "issuetype"], PAGE_SIZE).await?;

    Ok(Json(serde_json::json!({
        "summary": classify::status_summary(&page.issues),
        "total": page.issues.len(),
    })))
}

/// POST /api/summary: exact status counts over tickets with no fix version.
pub async fn status_counts(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing label or component")?;
    let label = required(&body.label, "Missing label or component")?;
    let component = required(&body.component, "Missing label or component")?;

    let jql = shapes::unversioned(jira.project_key(), label, component);
    let page = jira.search(&jql, &["status"], PAGE_SIZE).await?;

    Ok(Json(serde_json::json!({
        "counts": classify::status_counts(&page.issues),
    })))
}

/// POST /api/jira/tested-area: component and keyword digest of the cohort.
pub async fn tested_area_digest(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let label = required(&body.label, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;

    let jql = shapes::label_component(jira.project_key(), label, component);
    let page = jira.search(&jql, &["summary", "components"], PAGE_SIZE).await?;

    Ok(Json(serde_json::json!({
        "testedArea": tested_area(&page.issues),
    })))
}

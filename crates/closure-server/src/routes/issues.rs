use axum::extract::State;
use axum::Json;
use closure_core::jira::NewIssue;
use closure_core::types::ReleaseContext;

use super::{parse, required, Body};
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/jira/submit: file the release tracking task.
pub async fn submit_release(
    State(app): State<AppState>,
    body: Body<ReleaseContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let body = parse(body, "Missing required fields")?;
    let release_version = required(&body.release_version, "Missing required fields")?;
    let label = required(&body.label, "Missing required fields")?;
    let component = required(&body.component, "Missing required fields")?;

    let key = jira
        .create_issue(&NewIssue {
            release_version: release_version.to_string(),
            label: label.to_string(),
            component: component.to_string(),
        })
        .await?;
    tracing::info!(%key, "release tracking issue created");

    Ok(Json(serde_json::json!({ "issueKey": key })))
}

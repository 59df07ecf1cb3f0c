use axum::extract::State;
use axum::Json;
use closure_core::jql::Jql;
use closure_core::labels;

use crate::error::AppError;
use crate::state::AppState;

const INIT_SAMPLE_SIZE: u32 = 50;

/// GET /api/jira/labels: `-release` labels, highest sprint number first.
pub async fn list_labels(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let labels = labels::sort_release_labels(jira.labels().await?);
    Ok(Json(serde_json::json!({ "labels": labels })))
}

/// GET /api/jira/components: components of the configured project.
pub async fn list_components(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let components = app.jira()?.components().await?;
    Ok(Json(serde_json::json!({ "components": components })))
}

/// GET /api/init-data: labels seen on a recent issue sample, plus components.
///
/// Labels keep the order they were first seen in.
pub async fn init_data(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let jira = app.jira()?;
    let page = jira
        .search(&Jql::project(jira.project_key()), &["labels"], INIT_SAMPLE_SIZE)
        .await?;

    let mut labels: Vec<String> = Vec::new();
    for label in page.issues.iter().flat_map(|i| i.fields.labels.iter()) {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    let components = jira.components().await?;

    Ok(Json(serde_json::json!({
        "labels": labels,
        "components": components,
    })))
}

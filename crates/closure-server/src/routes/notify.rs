use axum::extract::State;
use axum::Json;
use closure_core::compose::{self, BugLink};
use closure_core::mailer::Mailer;
use closure_core::types::{BatchReport, Ticket};

use super::{parse, Body};
use crate::error::AppError;
use crate::state::AppState;

fn report_json(report: &BatchReport) -> serde_json::Value {
    serde_json::json!({
        "results": report.results,
        "summary": report.summary,
        "message": report.message(),
    })
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformDevBody {
    #[serde(default)]
    tickets: Option<Vec<Ticket>>,
    #[serde(default)]
    release_version: Option<String>,
}

/// POST /api/inform-dev: mail each ticket's assignee about the missing
/// release version. Per-ticket failures are reported, not raised.
pub async fn inform_developers(
    State(app): State<AppState>,
    body: Body<InformDevBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let smtp = app.settings.smtp()?;
    let jira = app.jira()?;
    let body = parse(body, "Missing or invalid tickets array")?;
    let tickets = body
        .tickets
        .ok_or_else(|| AppError::bad_request("Missing or invalid tickets array"))?;

    let mailer = Mailer::smtp(smtp)?;
    let report = mailer
        .notify_developers(&tickets, body.release_version.as_deref(), jira.base_url())
        .await;
    tracing::info!(
        sent = report.summary.sent,
        skipped = report.summary.skipped,
        errors = report.summary.errors,
        "developer notifications finished"
    );

    Ok(Json(report_json(&report)))
}

#[derive(serde::Deserialize)]
pub struct InformByKeyBody {
    #[serde(default)]
    issues: Option<Vec<String>>,
}

/// POST /api/jira/inform-dev: look each issue key up and mail its assignee.
pub async fn inform_developers_by_key(
    State(app): State<AppState>,
    body: Body<InformByKeyBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let smtp = app.settings.smtp()?;
    let jira = app.jira()?;
    let keys = parse(body, "Missing or invalid issues array")?
        .issues
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing or invalid issues array"))?;

    let mailer = Mailer::smtp(smtp)?;
    let report = mailer.notify_issue_assignees(jira, &keys).await;

    Ok(Json(report_json(&report)))
}

#[derive(serde::Deserialize)]
pub struct ProductTeamBody {
    #[serde(default)]
    bugs: Option<Vec<BugLink>>,
}

/// POST /api/email-product-team: one follow-up mail listing unresolved bugs.
pub async fn email_product_team(
    State(app): State<AppState>,
    body: Body<ProductTeamBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let smtp = app.settings.smtp()?;
    let to = app.settings.product_team_to()?;
    let bugs = parse(body, "Missing or invalid bugs array")?
        .bugs
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing or invalid bugs array"))?;

    let job = compose::product_team_followup(&bugs, to, &app.settings.product_team.cc);
    Mailer::smtp(smtp)?.send(&job).await?;

    Ok(Json(serde_json::json!({ "status": "sent" })))
}

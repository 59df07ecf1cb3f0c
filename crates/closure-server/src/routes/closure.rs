use axum::extract::State;
use axum::Json;
use closure_core::bug::Bug;
use closure_core::compose::{self, ClosureHtml, ClosurePreview, ClosureSummary};
use closure_core::mailer::Mailer;

use super::{parse, required, Body};
use crate::error::AppError;
use crate::state::AppState;

const MISSING_FIELDS: &str = "Missing required fields";

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendClosureBody {
    #[serde(default)]
    release_status: String,
    #[serde(default)]
    release_version: String,
    #[serde(default)]
    devs: Option<Vec<String>>,
    #[serde(default)]
    limitation: Option<String>,
    #[serde(default)]
    tested_area: String,
    #[serde(default)]
    found_bugs: Option<Vec<Bug>>,
}

/// POST /api/closure-email/send: mail the plain-text closure summary to the developers.
pub async fn send_closure_email(
    State(app): State<AppState>,
    body: Body<SendClosureBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let smtp = app.settings.smtp()?;
    let body = parse(body, MISSING_FIELDS)?;
    let release_status = required(&body.release_status, MISSING_FIELDS)?;
    let release_version = required(&body.release_version, MISSING_FIELDS)?;
    let tested_area = required(&body.tested_area, MISSING_FIELDS)?;
    let devs = body
        .devs
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::bad_request(MISSING_FIELDS))?;
    let bugs = body
        .found_bugs
        .ok_or_else(|| AppError::bad_request(MISSING_FIELDS))?;

    let job = compose::closure_summary(&ClosureSummary {
        release_status: release_status.to_string(),
        release_version: release_version.to_string(),
        developer_recipients: devs,
        limitations: body.limitation,
        tested_area: tested_area.to_string(),
        bugs,
    });
    Mailer::smtp(smtp)?.send(&job).await?;

    Ok(Json(serde_json::json!({ "status": "sent" })))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBody {
    #[serde(default)]
    release_status: String,
    #[serde(default)]
    release_version: String,
    #[serde(default)]
    reason_for_status: Option<String>,
    #[serde(default)]
    tested_areas: String,
    #[serde(default)]
    limitations: Option<String>,
    #[serde(default)]
    dev_email: Option<String>,
    #[serde(default)]
    bugs: Vec<Bug>,
}

/// POST /api/closure-email/preview: copy-ready subject and body; nothing is sent.
pub async fn preview_closure_email(
    body: Body<PreviewBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let body = parse(body, MISSING_FIELDS)?;
    required(&body.release_status, MISSING_FIELDS)?;
    required(&body.release_version, MISSING_FIELDS)?;

    let preview = compose::closure_preview(&ClosurePreview {
        release_status: body.release_status,
        release_version: body.release_version,
        reason_for_status: body.reason_for_status,
        tested_areas: body.tested_areas,
        limitations: body.limitations,
        dev_email: body.dev_email,
        bugs: body.bugs,
    });

    Ok(Json(serde_json::json!({
        "subject": preview.subject,
        "text": preview.text,
    })))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateClosureBody {
    #[serde(default)]
    release_status: String,
    #[serde(default)]
    release_version: String,
    #[serde(default)]
    dev_emails: Vec<String>,
    #[serde(default)]
    limitations: Option<String>,
    #[serde(default)]
    tested_area: Option<String>,
    #[serde(default)]
    found_bugs: Vec<Bug>,
}

/// POST /api/generate-closure-email: HTML closure summary.
pub async fn generate_closure_email(
    body: Body<GenerateClosureBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let body = parse(body, "Invalid closure email body")?;
    let html = compose::closure_html(&ClosureHtml {
        release_status: body.release_status,
        release_version: body.release_version,
        dev_emails: body.dev_emails,
        limitations: body.limitations,
        tested_area: body.tested_area,
        bugs: body.found_bugs,
    });
    Ok(Json(serde_json::json!({ "html": html })))
}

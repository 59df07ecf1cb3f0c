use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/health: liveness plus which upstream services are configured.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "jira": app.settings.has_jira(),
        "smtp": app.settings.has_smtp(),
    }))
}

pub mod bugs;
pub mod catalog;
pub mod closure;
pub mod diagnostics;
pub mod health;
pub mod issues;
pub mod notify;
pub mod summary;
pub mod tickets;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// JSON body whose rejection is left to the handler, so configuration
/// checks run before the payload is judged.
pub(crate) type Body<T> = Result<Json<T>, JsonRejection>;

/// Payload of `body`, or a 400 carrying `message` when it did not parse.
pub(crate) fn parse<T>(body: Body<T>, message: &str) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "request body rejected");
        AppError::bad_request(message)
    })
}

/// Trimmed value of a required text field, or a 400 carrying `message`.
pub(crate) fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    match value.trim() {
        "" => Err(AppError::bad_request(message)),
        v => Ok(v),
    }
}

/// Issue fields every ticket listing asks the tracker for.
pub(crate) const TICKET_FIELDS: &[&str] = &[
    "summary",
    "status",
    "assignee",
    "labels",
    "components",
    "fixVersions",
];

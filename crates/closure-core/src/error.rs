use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClosureError {
    #[error("missing {section} environment variables: {}", missing.join(", "))]
    Configuration {
        section: &'static str,
        missing: Vec<String>,
    },

    #[error("{0}")]
    Validation(String),

    #[error("invalid label format '{0}': expected S<number>")]
    InvalidLabelFormat(String),

    #[error("tracker query failed: {status} {body}")]
    TrackerStatus { status: u16, body: String },

    #[error("tracker request failed: {0}")]
    TrackerTransport(String),

    #[error("{0}")]
    TrackerRejected(String),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClosureError {
    fn from(err: reqwest::Error) -> Self {
        ClosureError::TrackerTransport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClosureError>;

use closure_core::config::Settings;
use closure_core::jira::JiraClient;
use closure_core::mailer::Mailer;
use closure_core::Result;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// Holds only what was read at startup; nothing mutable lives here.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    jira: Option<JiraClient>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let jira = settings.jira().ok().map(JiraClient::new);
        Self {
            settings: Arc::new(settings),
            jira,
        }
    }

    /// Tracker client, or the configuration error naming what is missing.
    pub fn jira(&self) -> Result<&JiraClient> {
        match &self.jira {
            Some(client) => Ok(client),
            None => Err(self
                .settings
                .jira()
                .err()
                .unwrap_or_else(|| closure_core::ClosureError::Configuration {
                    section: "Jira",
                    missing: Vec::new(),
                })),
        }
    }

    /// A fresh SMTP mailer for this request.
    pub fn mailer(&self) -> Result<Mailer> {
        Mailer::smtp(self.settings.smtp()?)
    }
}

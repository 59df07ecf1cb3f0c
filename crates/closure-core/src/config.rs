use crate::error::{ClosureError, Result};
use lettre::message::Mailbox;
use serde::Serialize;

pub const DEFAULT_SEVERITY_FIELD: &str = "customfield_10034";

const JIRA_VARS: [&str; 4] = [
    "JIRA_BASE_URL",
    "JIRA_EMAIL",
    "JIRA_API_TOKEN",
    "JIRA_PROJECT_KEY",
];
const SMTP_VARS: [&str; 4] = ["SMTP_HOST", "SMTP_PORT", "SMTP_USER", "SMTP_PASS"];

// ---------------------------------------------------------------------------
// JiraSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct JiraSettings {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
}

// ---------------------------------------------------------------------------
// SmtpSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

impl SmtpSettings {
    /// Port 465 speaks TLS from the first byte; everything else upgrades.
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

// ---------------------------------------------------------------------------
// ProductTeamSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ProductTeamSettings {
    pub to: Option<String>,
    pub cc: Vec<String>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Process-wide configuration, read once at startup.
///
/// Either service section may be absent; handlers that need it ask for it
/// through [`Settings::jira`] / [`Settings::smtp`] and surface the missing
/// variables as a configuration error.
#[derive(Debug, Clone)]
pub struct Settings {
    jira: Option<JiraSettings>,
    smtp: Option<SmtpSettings>,
    missing_jira: Vec<String>,
    missing_smtp: Vec<String>,
    pub product_team: ProductTeamSettings,
    pub severity_field: String,
}

/// Presence of one known variable, for `closure config`.
#[derive(Debug, Clone, Serialize)]
pub struct VariableStatus {
    pub name: &'static str,
    pub set: bool,
    pub required: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing_jira: Vec<String> = JIRA_VARS
            .iter()
            .filter(|&&k| get(k).is_none())
            .map(|k| k.to_string())
            .collect();
        let jira = if missing_jira.is_empty() {
            Some(JiraSettings {
                base_url: get("JIRA_BASE_URL")
                    .unwrap_or_default()
                    .trim_end_matches('/')
                    .to_string(),
                email: get("JIRA_EMAIL").unwrap_or_default(),
                api_token: get("JIRA_API_TOKEN").unwrap_or_default(),
                project_key: get("JIRA_PROJECT_KEY").unwrap_or_default(),
            })
        } else {
            None
        };

        let mut missing_smtp: Vec<String> = SMTP_VARS
            .iter()
            .filter(|&&k| get(k).is_none())
            .map(|k| k.to_string())
            .collect();
        let port = get("SMTP_PORT").and_then(|p| p.parse::<u16>().ok());
        if port.is_none() && !missing_smtp.iter().any(|k| k == "SMTP_PORT") {
            missing_smtp.push("SMTP_PORT (not a valid port)".to_string());
        }
        // SMTP_USER doubles as the sender unless SMTP_FROM is set.
        let sender_var = if get("SMTP_FROM").is_some() {
            "SMTP_FROM"
        } else {
            "SMTP_USER"
        };
        if get(sender_var).is_some_and(|sender| sender.parse::<Mailbox>().is_err()) {
            missing_smtp.push(format!("{sender_var} (not a valid sender address)"));
        }
        let smtp = match (missing_smtp.is_empty(), port) {
            (true, Some(port)) => {
                let user = get("SMTP_USER").unwrap_or_default();
                Some(SmtpSettings {
                    host: get("SMTP_HOST").unwrap_or_default(),
                    port,
                    from: get("SMTP_FROM").unwrap_or_else(|| user.clone()),
                    user,
                    password: get("SMTP_PASS").unwrap_or_default(),
                })
            }
            _ => None,
        };

        let product_team = ProductTeamSettings {
            to: get("PRODUCT_TEAM_TO"),
            cc: get("PRODUCT_TEAM_CC")
                .map(|cc| {
                    cc.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        Self {
            jira,
            smtp,
            missing_jira,
            missing_smtp,
            product_team,
            severity_field: get("JIRA_SEVERITY_FIELD")
                .unwrap_or_else(|| DEFAULT_SEVERITY_FIELD.to_string()),
        }
    }

    pub fn jira(&self) -> Result<&JiraSettings> {
        self.jira.as_ref().ok_or_else(|| ClosureError::Configuration {
            section: "Jira",
            missing: self.missing_jira.clone(),
        })
    }

    pub fn smtp(&self) -> Result<&SmtpSettings> {
        self.smtp.as_ref().ok_or_else(|| ClosureError::Configuration {
            section: "SMTP",
            missing: self.missing_smtp.clone(),
        })
    }

    pub fn product_team_to(&self) -> Result<&str> {
        self.product_team
            .to
            .as_deref()
            .ok_or_else(|| ClosureError::Configuration {
                section: "product team",
                missing: vec!["PRODUCT_TEAM_TO".to_string()],
            })
    }

    pub fn has_jira(&self) -> bool {
        self.jira.is_some()
    }

    pub fn has_smtp(&self) -> bool {
        self.smtp.is_some()
    }

    /// Every known variable with its presence, in declaration order.
    pub fn variable_report<F>(lookup: F) -> Vec<VariableStatus>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = [
            "SMTP_FROM",
            "JIRA_SEVERITY_FIELD",
            "PRODUCT_TEAM_TO",
            "PRODUCT_TEAM_CC",
        ];
        JIRA_VARS
            .iter()
            .chain(SMTP_VARS.iter())
            .map(|name| (*name, true))
            .chain(optional.iter().map(|name| (*name, false)))
            .map(|(name, required)| VariableStatus {
                name,
                set: lookup(name).is_some_and(|v| !v.trim().is_empty()),
                required,
            })
            .collect()
    }
}

//! Jira Cloud REST client (v3) and the subset of its wire format the closure
//! flows read.

use crate::config::JiraSettings;
use crate::error::{ClosureError, Result};
use crate::jql::Jql;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Callers ask for one page of this size; there is no pagination loop.
pub const PAGE_SIZE: u32 = 100;

fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedField {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<NamedField>,
    #[serde(default)]
    pub priority: Option<NamedField>,
    #[serde(default)]
    pub issuetype: Option<NamedField>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<Component>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fix_versions: Vec<Version>,
    /// Custom fields (`customfield_*`) and anything else requested.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

impl Issue {
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or("")
    }

    pub fn status_name(&self) -> &str {
        self.fields.status.as_ref().map(|s| s.name.as_str()).unwrap_or("")
    }

    pub fn priority_name(&self) -> &str {
        self.fields
            .priority
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("")
    }

    pub fn issue_type_name(&self) -> &str {
        self.fields
            .issuetype
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    /// Text value of a custom field. Select-style fields arrive as
    /// `{"value": ..}` objects, user-style ones as `{"name": ..}`.
    pub fn custom_text(&self, field: &str) -> Option<String> {
        let value = self.fields.extra.get(field)?;
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("value")
                .or_else(|| map.get("name"))
                .and_then(|v| v.as_str())?
                .to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(text).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub start_at: u32,
}

#[derive(Debug, Deserialize)]
struct LabelPage {
    #[serde(default)]
    values: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

/// Tracking issue filed for a release cohort.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub release_version: String,
    pub label: String,
    pub component: String,
}

impl NewIssue {
    fn body(&self, project_key: &str) -> serde_json::Value {
        serde_json::json!({
            "fields": {
                "project": { "key": project_key },
                "summary": format!(
                    "Release {} - {} - {}",
                    self.release_version, self.label, self.component
                ),
                "description": format!(
                    "Release Version: {}\nLabel: {}\nComponent: {}",
                    self.release_version, self.label, self.component
                ),
                "issuetype": { "name": "Task" },
                "labels": [self.label],
                "components": [{ "name": self.component }],
            }
        })
    }
}

// ---------------------------------------------------------------------------
// JiraClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
    project_key: String,
}

impl JiraClient {
    pub fn new(settings: &JiraSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.clone(),
            email: settings.email.clone(),
            api_token: settings.api_token.clone(),
            project_key: settings.project_key.clone(),
        }
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClosureError::TrackerStatus {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// First page of issues matching `jql`.
    pub async fn search(&self, jql: &Jql, fields: &[&str], max_results: u32) -> Result<SearchPage> {
        let rendered = jql.render();
        tracing::debug!(jql = %rendered, "searching tracker");
        let resp = self
            .get("/rest/api/3/search")
            .query(&[
                ("jql", rendered),
                ("fields", fields.join(",")),
                ("maxResults", max_results.to_string()),
            ])
            .send()
            .await?;
        Self::read_json(resp).await
    }

    /// All labels known to the tracker (not only this project's).
    pub async fn labels(&self) -> Result<Vec<String>> {
        let resp = self.get("/rest/api/3/label").send().await?;
        let page: LabelPage = Self::read_json(resp).await?;
        Ok(page.values.or(page.labels).unwrap_or_default())
    }

    pub async fn components(&self) -> Result<Vec<Component>> {
        let path = format!("/rest/api/3/project/{}/components", self.project_key);
        let resp = self.get(&path).send().await?;
        Self::read_json(resp).await
    }

    pub async fn issue(&self, key: &str, fields: &[&str]) -> Result<Issue> {
        let resp = self
            .get(&format!("/rest/api/3/issue/{key}"))
            .query(&[("fields", fields.join(","))])
            .send()
            .await?;
        Self::read_json(resp).await
    }

    /// Create the release tracking task and return its key.
    pub async fn create_issue(&self, new: &NewIssue) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/rest/api/3/issue", self.base_url))
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&new.body(&self.project_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let messages = serde_json::from_str::<JiraErrorBody>(&body)
                .map(|e| e.error_messages)
                .unwrap_or_default();
            if messages.is_empty() {
                return Err(ClosureError::TrackerStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            return Err(ClosureError::TrackerRejected(messages.join(", ")));
        }
        let created: CreatedIssue = Self::read_json(resp).await?;
        Ok(created.key)
    }
}

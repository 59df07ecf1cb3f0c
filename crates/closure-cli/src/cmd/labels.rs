use crate::output::print_json;
use anyhow::Result;
use closure_core::config::Settings;
use closure_core::jira::JiraClient;
use closure_core::labels::sort_release_labels;

pub fn run(json: bool) -> Result<()> {
    let settings = Settings::from_env();
    let client = JiraClient::new(settings.jira()?);

    let rt = tokio::runtime::Runtime::new()?;
    let labels = sort_release_labels(rt.block_on(client.labels())?);

    if json {
        return print_json(&serde_json::json!({ "labels": labels }));
    }
    if labels.is_empty() {
        println!("No release labels.");
    }
    for label in &labels {
        println!("{label}");
    }
    Ok(())
}

use crate::output::print_json;
use anyhow::{anyhow, bail, Context, Result};
use closure_core::jql::{shapes, Jql};
use closure_core::labels::previous_label;

fn need<'a>(value: Option<&'a str>, flag: &str, shape: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("--{flag} is required for shape '{shape}'"))
}

fn build(project: &str, shape: &str, label: Option<&str>, component: Option<&str>) -> Result<Jql> {
    if shape == "recent" {
        return Ok(shapes::recent(project));
    }
    let label = need(label, "label", shape)?;
    if shape == "bugs" {
        let component = component.map(str::trim).filter(|c| !c.is_empty());
        return Ok(shapes::bugs(project, label, component));
    }
    let component = need(component, "component", shape)?;

    let jql = match shape {
        "open-release" => shapes::open_release(project, label, component),
        "dev-released" => shapes::dev_released_unversioned(project, label, component),
        "release-field-missing" => {
            shapes::dev_released_missing_release_field(project, label, component)
        }
        "label-component" => shapes::label_component(project, label, component),
        "unversioned" => shapes::unversioned(project, label, component),
        "previous-bugs" => shapes::previous_bugs(project, &previous_label(label)?, component),
        other => bail!(
            "unknown shape '{other}'; expected one of: {}",
            shapes::NAMES.join(", ")
        ),
    };
    Ok(jql)
}

pub fn run(shape: &str, label: Option<&str>, component: Option<&str>, json: bool) -> Result<()> {
    let project = std::env::var("JIRA_PROJECT_KEY")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .context("JIRA_PROJECT_KEY is not set")?;
    let jql = build(project.trim(), shape, label, component)?;

    if json {
        print_json(&serde_json::json!({
            "shape": shape,
            "jql": jql.render(),
        }))
    } else {
        println!("{jql}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_release_formats_label() {
        let jql = build("APP", "open-release", Some("S12"), Some("POS")).unwrap();
        assert!(jql.render().contains("labels = \"s12-release\""));
    }

    #[test]
    fn bugs_component_is_optional() {
        let jql = build("APP", "bugs", Some("S12"), None).unwrap();
        assert!(!jql.render().contains("component"));
    }

    #[test]
    fn previous_bugs_steps_label_back() {
        let jql = build("APP", "previous-bugs", Some("S138"), Some("POS")).unwrap();
        assert!(jql.render().contains("\"S137\""));
    }

    #[test]
    fn unknown_shape_lists_names() {
        let err = build("APP", "nope", Some("S1"), Some("POS")).unwrap_err();
        assert!(err.to_string().contains("open-release"));
    }

    #[test]
    fn missing_component_is_reported() {
        let err = build("APP", "unversioned", Some("S1"), None).unwrap_err();
        assert!(err.to_string().contains("--component"));
    }
}

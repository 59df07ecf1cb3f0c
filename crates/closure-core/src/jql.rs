//! Conjunctive JQL builder and the named query shapes the closure flows use.
//!
//! Clause values are wrapped in double quotes and interpolated verbatim, so a
//! label or component containing `"` breaks out of its literal. Values come
//! straight from request bodies.

use std::fmt;

pub const STATUS_OPEN: &str = "Open";
pub const STATUS_DEV_RELEASED: &str = "Dev Released";
pub const ISSUE_TYPE_BUG: &str = "Bug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jql {
    clauses: Vec<String>,
    order_by: Option<String>,
}

impl Jql {
    /// Every query is scoped to one project.
    pub fn project(key: &str) -> Self {
        Self {
            clauses: vec![format!("project = {key}")],
            order_by: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.clauses.push(format!("labels = \"{label}\""));
        self
    }

    pub fn component(mut self, component: &str) -> Self {
        self.clauses.push(format!("component = \"{component}\""));
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.clauses.push(format!("status = \"{status}\""));
        self
    }

    pub fn issue_type(mut self, issue_type: &str) -> Self {
        self.clauses.push(format!("issuetype = {issue_type}"));
        self
    }

    pub fn fix_version_empty(mut self) -> Self {
        self.clauses.push("fixVersion is EMPTY".to_string());
        self
    }

    /// The free-text "Release Version" field some projects use instead of
    /// fix versions. Empty and blank both count.
    pub fn release_version_field_empty(mut self) -> Self {
        self.clauses
            .push("(\"Release Version\" is EMPTY OR \"Release Version\" = \"\")".to_string());
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by = Some(clause.to_string());
        self
    }

    pub fn render(&self) -> String {
        let mut out = self.clauses.join(" AND ");
        if let Some(order) = &self.order_by {
            out.push_str(" ORDER BY ");
            out.push_str(order);
        }
        out
    }
}

impl fmt::Display for Jql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ---------------------------------------------------------------------------
// Named shapes
// ---------------------------------------------------------------------------

pub mod shapes {
    use super::{Jql, ISSUE_TYPE_BUG, STATUS_DEV_RELEASED, STATUS_OPEN};
    use crate::labels::release_label;

    /// Open tickets tagged with the `-release` form of the label.
    pub fn open_release(project: &str, label: &str, component: &str) -> Jql {
        Jql::project(project)
            .status(STATUS_OPEN)
            .label(&release_label(label))
            .component(component)
    }

    /// Dev Released tickets (literal label) with no fix version.
    pub fn dev_released_unversioned(project: &str, label: &str, component: &str) -> Jql {
        Jql::project(project)
            .label(label)
            .component(component)
            .status(STATUS_DEV_RELEASED)
            .fix_version_empty()
    }

    /// Dev Released tickets (literal label) whose "Release Version" field is blank.
    pub fn dev_released_missing_release_field(
        project: &str,
        label: &str,
        component: &str,
    ) -> Jql {
        Jql::project(project)
            .status(STATUS_DEV_RELEASED)
            .label(label)
            .component(component)
            .release_version_field_empty()
    }

    pub fn label_component(project: &str, label: &str, component: &str) -> Jql {
        Jql::project(project).label(label).component(component)
    }

    pub fn unversioned(project: &str, label: &str, component: &str) -> Jql {
        label_component(project, label, component).fix_version_empty()
    }

    pub fn bugs(project: &str, label: &str, component: Option<&str>) -> Jql {
        let jql = Jql::project(project).issue_type(ISSUE_TYPE_BUG).label(label);
        match component {
            Some(c) => jql.component(c),
            None => jql,
        }
    }

    pub fn previous_bugs(project: &str, previous_label: &str, component: &str) -> Jql {
        Jql::project(project)
            .label(previous_label)
            .component(component)
            .issue_type(ISSUE_TYPE_BUG)
    }

    pub fn recent(project: &str) -> Jql {
        Jql::project(project).order_by("created DESC")
    }

    /// Shape names accepted by `closure jql`.
    pub const NAMES: &[&str] = &[
        "open-release",
        "dev-released",
        "release-field-missing",
        "label-component",
        "unversioned",
        "bugs",
        "previous-bugs",
        "recent",
    ];
}

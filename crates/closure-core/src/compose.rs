//! Email bodies for developer nudges, product follow-ups, and the release
//! closure summary. Pure string building; values are inserted verbatim.

use crate::bug::Bug;
use crate::types::{EmailJob, Ticket};
use serde::Deserialize;

pub const STATUS_GOOD_TO_GO_LIVE: &str = "Good to go LIVE";
const SIGN_OFF: &str = "Thanks,\nQA Team";
const NO_BUGS: &str = "No bugs found.";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(fallback)
}

// ---------------------------------------------------------------------------
// Developer notifications
// ---------------------------------------------------------------------------

pub fn missing_version_subject(key: &str, release_version: Option<&str>) -> String {
    let base = format!("Urgent: Jira Ticket {key} Missing Release Version");
    match release_version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!("{base} ({v})"),
        None => base,
    }
}

/// Nudge for one ticket whose release version is not set.
pub fn developer_notification(
    ticket: &Ticket,
    to: &str,
    release_version: Option<&str>,
    base_url: &str,
) -> EmailJob {
    let name = ticket.assignee_name().unwrap_or("Developer");
    let current = if ticket.fix_versions.is_empty() {
        "Not set".to_string()
    } else {
        ticket.fix_versions.join(", ")
    };
    let text = format!(
        "Hi {name},\n\n\
         It looks like this Jira ticket hasn't been linked to a release version. \
         Please update it as soon as possible:\n\n\
         Ticket: {key}\n\
         Summary: {summary}\n\
         Status: {status}\n\
         Current Release Version: {current}\n\
         Target Release Version: {target}\n\n\
         {base_url}/browse/{key}\n\n\
         {SIGN_OFF}",
        key = ticket.key,
        summary = ticket.summary,
        status = ticket.status,
        target = or_default(release_version, "Not specified"),
    );
    EmailJob {
        to: vec![to.to_string()],
        subject: missing_version_subject(&ticket.key, release_version),
        text,
        ..Default::default()
    }
}

/// Nudge built from a single issue looked up by key.
pub fn issue_notification(
    key: &str,
    assignee_name: Option<&str>,
    to: &str,
    summary: &str,
    browse_url: &str,
) -> EmailJob {
    let text = format!(
        "Hi {name},\n\n\
         It looks like this Jira ticket hasn't been linked to a release version. \
         Please update it as soon as possible:\n\n\
         {browse_url}\n\n\
         Ticket: {summary}\n\n\
         {SIGN_OFF}",
        name = or_default(assignee_name, "Developer"),
    );
    EmailJob {
        to: vec![to.to_string()],
        subject: missing_version_subject(key, None),
        text,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Product team follow-up
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BugLink {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
}

pub fn product_team_followup(bugs: &[BugLink], to: &str, cc: &[String]) -> EmailJob {
    let list = bugs
        .iter()
        .map(|b| format!("    {} - {}", b.url, b.summary))
        .collect::<Vec<_>>()
        .join("\n");
    let text = format!(
        "Hi Product Team,\n\n\
         Just a quick heads-up that a few critical bugs are still unresolved.\n\
         Here are the Jira tickets:\n\n\
         {list}\n\n\
         Could you please provide an update on these?\n\n\
         {SIGN_OFF}"
    );
    EmailJob {
        to: vec![to.to_string()],
        cc: cc.to_vec(),
        subject: "Action Required: Unresolved Bugs".to_string(),
        text,
        html: None,
    }
}

// ---------------------------------------------------------------------------
// Closure summary (plain text, sent)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ClosureSummary {
    pub release_status: String,
    pub release_version: String,
    pub developer_recipients: Vec<String>,
    pub limitations: Option<String>,
    pub tested_area: String,
    pub bugs: Vec<Bug>,
}

pub fn closure_subject(release_version: &str) -> String {
    format!("Test Closure: Release {release_version}")
}

/// Numbered one-line-per-bug listing, or "No bugs found.".
pub fn bug_lines(bugs: &[Bug]) -> String {
    if bugs.is_empty() {
        return NO_BUGS.to_string();
    }
    bugs.iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                "{}. {} | Status: {} | Severity: {} | Legacy: {} | Priority: {}",
                i + 1,
                b.title,
                b.status,
                b.severity,
                yes_no(b.legacy),
                b.priority
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The bug section is always present here, whatever the release status.
pub fn closure_summary(summary: &ClosureSummary) -> EmailJob {
    let text = format!(
        "Release Status: {status}\n\
         Release Version: {version}\n\n\
         Tested Area:\n{tested}\n\n\
         Limitation:\n{limitation}\n\n\
         Found Bugs:\n{bugs}\n\n\
         {SIGN_OFF}",
        status = summary.release_status,
        version = summary.release_version,
        tested = summary.tested_area,
        limitation = or_default(summary.limitations.as_deref(), "None"),
        bugs = bug_lines(&summary.bugs),
    );
    EmailJob {
        to: summary.developer_recipients.clone(),
        subject: closure_subject(&summary.release_version),
        text,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Closure summary (HTML)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ClosureHtml {
    pub release_status: String,
    pub release_version: String,
    pub dev_emails: Vec<String>,
    pub limitations: Option<String>,
    pub tested_area: Option<String>,
    pub bugs: Vec<Bug>,
}

pub fn bug_table_html(bugs: &[Bug]) -> String {
    if bugs.is_empty() {
        return format!("<p>{NO_BUGS}</p>");
    }
    let rows: String = bugs
        .iter()
        .map(|b| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                b.title,
                b.status,
                b.severity,
                yes_no(b.legacy),
                b.priority
            )
        })
        .collect();
    format!(
        "<table border=\"1\" cellpadding=\"5\" cellspacing=\"0\">\
         <tr><th>Title</th><th>Status</th><th>Severity</th><th>Legacy</th><th>Priority</th></tr>\
         {rows}</table>"
    )
}

pub fn closure_html(input: &ClosureHtml) -> String {
    let tested = match input.tested_area.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => format!("Tested Area: {t}"),
        _ => "Tested Area: [summary of filtered tickets pending]".to_string(),
    };
    format!(
        "<h2>Release Status: {status}</h2>\n\
         <h3>Release Version: {version}</h3>\n\
         <p><b>Developers:</b> {devs}</p>\n\
         <p><b>Limitations:</b> {limitations}</p>\n\
         <p>{tested}</p>\n\
         <h3>Found Bugs</h3>\n\
         {table}\n\
         <p>Thanks,<br/>QA Team</p>",
        status = input.release_status,
        version = input.release_version,
        devs = input.dev_emails.join(", "),
        limitations = or_default(input.limitations.as_deref(), "None"),
        table = bug_table_html(&input.bugs),
    )
}

// ---------------------------------------------------------------------------
// Closure preview (copy/paste text with ASCII table)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ClosurePreview {
    pub release_status: String,
    pub release_version: String,
    pub reason_for_status: Option<String>,
    pub tested_areas: String,
    pub limitations: Option<String>,
    pub dev_email: Option<String>,
    pub bugs: Vec<Bug>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub subject: String,
    pub text: String,
}

const TABLE_RULE: &str =
    "+--------------------------------------------------+-------------+----------+---------+----------+";

fn ascii_bug_table(bugs: &[Bug]) -> String {
    let mut out = vec![
        TABLE_RULE.to_string(),
        "| Bug Title                                        | Status      | Severity | Legacy  | Priority |"
            .to_string(),
        TABLE_RULE.to_string(),
    ];
    out.extend(bugs.iter().map(|b| {
        format!(
            "| {:<48.48} | {:<11.11} | {:<8.8} | {:<7.7} | {:<8.8} |",
            b.title,
            b.status,
            b.severity,
            yes_no(b.legacy),
            b.priority
        )
    }));
    out.push(TABLE_RULE.to_string());
    out.join("\n")
}

fn section(title: &str, body: Option<&str>) -> String {
    match body.map(str::trim).filter(|b| !b.is_empty()) {
        Some(b) => format!("{title}:\n{b}\n\n"),
        None => String::new(),
    }
}

/// Preview text; the bug table is left out when the release is
/// "Good to go LIVE".
pub fn closure_preview(input: &ClosurePreview) -> Preview {
    let bugs = if input.release_status == STATUS_GOOD_TO_GO_LIVE {
        String::new()
    } else {
        format!("FOUND BUGS:\n{}\n\n", ascii_bug_table(&input.bugs))
    };
    let lead = match input.dev_email.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => format!("Development Lead: {e}\n\n"),
        _ => String::new(),
    };
    let text = format!(
        "Dear Team,\n\n\
         I hope this email finds you well. I'm writing to provide you with the closure summary for release {version}.\n\n\
         RELEASE STATUS: {status}\n\n\
         {reason}\
         TESTED AREAS:\n{tested}\n\n\
         {limitations}\
         {bugs}\
         {lead}\
         Please review the above information and let me know if you have any questions or concerns.\n\n\
         Best regards,\nQA Team",
        version = input.release_version,
        status = input.release_status,
        reason = section("REASON FOR STATUS", input.reason_for_status.as_deref()),
        tested = input.tested_areas,
        limitations = section("LIMITATIONS", input.limitations.as_deref()),
    );
    Preview {
        subject: format!("Release Closure - {}", input.release_version),
        text,
    }
}

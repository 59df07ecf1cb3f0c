use crate::error::{ClosureError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

fn cohort_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^S(\d+)$").expect("static regex"))
}

fn release_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)s(\d+)-release").expect("static regex"))
}

/// `S138` -> `s138-release`.
pub fn release_label(label: &str) -> String {
    format!("{}-release", label.to_lowercase())
}

/// `S138` -> `S137`. Anything other than `S<digits>` (or `S0`) has no
/// predecessor.
pub fn previous_label(label: &str) -> Result<String> {
    let n: u64 = cohort_re()
        .captures(label.trim())
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| ClosureError::InvalidLabelFormat(label.to_string()))?;
    let prev = n
        .checked_sub(1)
        .ok_or_else(|| ClosureError::InvalidLabelFormat(label.to_string()))?;
    Ok(format!("S{prev}"))
}

fn release_number(label: &str) -> Option<u64> {
    release_re()
        .captures(label)
        .and_then(|c| c[1].parse().ok())
}

/// Keep `*-release` labels, newest cohort first. Labels without a cohort
/// number sort after the numbered ones, lexically.
pub fn sort_release_labels(labels: Vec<String>) -> Vec<String> {
    let mut release: Vec<String> = labels
        .into_iter()
        .filter(|l| l.to_lowercase().ends_with("-release"))
        .collect();
    release.sort_by(|a, b| match (release_number(a), release_number(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });
    release
}

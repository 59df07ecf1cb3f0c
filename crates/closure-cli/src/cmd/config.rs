use crate::output::{print_json, print_table};
use anyhow::Result;
use closure_core::config::Settings;

/// Presence of every known variable. Values are never printed.
pub fn run(json: bool) -> Result<()> {
    let report = Settings::variable_report(|key| std::env::var(key).ok());
    if json {
        return print_json(&report);
    }

    let rows: Vec<[String; 3]> = report
        .iter()
        .map(|v| {
            [
                v.name.to_string(),
                (if v.required { "yes" } else { "no" }).to_string(),
                (if v.set { "set" } else { "missing" }).to_string(),
            ]
        })
        .collect();
    print_table(["VARIABLE", "REQUIRED", "STATUS"], &rows);
    Ok(())
}

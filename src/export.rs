//! Write an [`AggregatedActivity`] as JSON.
//!
//! This is the hand-off point to report generation: the JSON document on
//! stdout (or in `--output`) is the only thing downstream layers consume.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::AggregatedActivity;

/// Serialize `activity` as pretty JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub fn write_json(activity: &AggregatedActivity, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(activity)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                "Wrote {} local entries and {} GitHub items to {}",
                activity.local_changes().len(),
                activity.github_activity().commits.len()
                    + activity.github_activity().pull_requests.len()
                    + activity.github_activity().issues.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

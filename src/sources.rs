use anyhow::Result;

use crate::aggregate::UNKNOWN_REPO;
use crate::config::Config;

/// Print configured directories with their enabled/exists status.
pub fn list_directories(config: &Config) -> Result<()> {
    let dirs = config.descriptors();
    if dirs.is_empty() {
        println!("No directories configured.");
        return Ok(());
    }

    println!(
        "{:<16} {:<8} {:<7} {:<16} {:<28} PATH",
        "ID", "ENABLED", "EXISTS", "BRANCH", "REPOSITORY"
    );
    for dir in &dirs {
        println!(
            "{:<16} {:<8} {:<7} {:<16} {:<28} {}",
            dir.id,
            dir.enabled,
            dir.path.exists(),
            dir.branch.as_deref().unwrap_or("(HEAD)"),
            dir.repo_name.as_deref().unwrap_or(UNKNOWN_REPO),
            dir.path.display()
        );
    }

    let active = dirs.iter().filter(|d| d.enabled && d.path.exists()).count();
    println!();
    println!("{} of {} directories will be collected", active, dirs.len());

    Ok(())
}

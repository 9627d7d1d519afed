//! Aggregation pipeline orchestration.
//!
//! Coordinates one run: local change collection (bounded fan-out across
//! directories) → GitHub activity (one call) → repository grouping →
//! [`AggregatedActivity`]. Per-directory and per-source failures are
//! absorbed by the collectors; the only error a run can return is an empty
//! directory list.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::activity::fetch_activity;
use crate::collect::LocalChangeCollector;
use crate::config::{CollectionConfig, Config};
use crate::error::AggregateError;
use crate::models::{ActivityMetadata, AggregatedActivity, DirectoryDescriptor};
use crate::traits::{ActivitySource, GitQuery};
use crate::window::ReportWindow;

/// Bucket for directories without a repository name.
pub const UNKNOWN_REPO: &str = "unknown";

/// Directories grouped by `repo_name`, with unnamed ones under
/// [`UNKNOWN_REPO`].
pub fn group_by_repo(dirs: &[DirectoryDescriptor]) -> BTreeMap<&str, Vec<&DirectoryDescriptor>> {
    let mut groups: BTreeMap<&str, Vec<&DirectoryDescriptor>> = BTreeMap::new();
    for dir in dirs {
        let key = dir
            .repo_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_REPO);
        groups.entry(key).or_default().push(dir);
    }
    groups
}

/// Distinct non-empty repository names, in first-appearance order.
pub fn configured_repos(dirs: &[DirectoryDescriptor]) -> Vec<String> {
    let mut repos: Vec<String> = Vec::new();
    for name in dirs
        .iter()
        .filter_map(|d| d.repo_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        if !repos.iter().any(|r| r == name) {
            repos.push(name.to_string());
        }
    }
    repos
}

/// Runs the aggregation pipeline against a git and a GitHub backend.
pub struct Aggregator {
    collector: LocalChangeCollector,
    github: Arc<dyn ActivitySource>,
}

impl Aggregator {
    pub fn new(
        git: Arc<dyn GitQuery>,
        github: Arc<dyn ActivitySource>,
        collection: &CollectionConfig,
    ) -> Self {
        Self {
            collector: LocalChangeCollector::from_config(git, collection),
            github,
        }
    }

    /// Build from a loaded config using the git CLI and the configured
    /// GitHub backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let verbose = config.log.verbose_commands;
        let git: Arc<dyn GitQuery> = Arc::new(crate::connector_git::GitCli::new(verbose));
        let github = crate::activity::build_source(&config.github, verbose)?;
        Ok(Self::new(git, github, &config.collection))
    }

    /// Aggregate local state for `dirs` and `user`'s GitHub activity.
    ///
    /// `dirs` must already be filtered to enabled, existing directories.
    pub async fn run(
        &self,
        dirs: &[DirectoryDescriptor],
        user: &str,
        window: &ReportWindow,
    ) -> Result<AggregatedActivity, AggregateError> {
        if dirs.is_empty() {
            return Err(AggregateError::NoDirectories);
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("aggregate", %run_id, user);

        async move {
            let groups = group_by_repo(dirs);
            info!(
                "Processing {} directories across {} repositories...",
                dirs.len(),
                groups.len()
            );

            let local_changes = self.collector.collect(dirs).await;
            let github_activity = fetch_activity(self.github.as_ref(), user, window).await;

            let repos = configured_repos(dirs);
            let metadata = ActivityMetadata {
                user: user.to_string(),
                days: window.days,
                directory_count: dirs.len(),
                repo_count: repos.len(),
                configured_repos: repos,
            };

            info!(
                local_changes = local_changes.len(),
                repos = metadata.repo_count,
                "aggregation complete"
            );
            Ok(AggregatedActivity::new(
                github_activity,
                local_changes,
                metadata,
            ))
        }
        .instrument(span)
        .await
    }
}

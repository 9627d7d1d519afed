//! GitHub activity retrieval for one aggregation run.
//!
//! The user's activity is fetched once per run, across all repositories,
//! including ones that are not checked out locally. The same bundle serves
//! every configured directory.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{GitHubBackend, GitHubConfig};
use crate::connector_github::GhCli;
use crate::connector_github_api::GhApi;
use crate::models::GitHubActivity;
use crate::traits::ActivitySource;
use crate::window::ReportWindow;

/// Fetch `username`'s activity for `window` with a single source call.
///
/// Any failure degrades to an empty bundle.
pub async fn fetch_activity(
    source: &dyn ActivitySource,
    username: &str,
    window: &ReportWindow,
) -> GitHubActivity {
    info!(
        source = source.name(),
        "Collecting GitHub activity for {} since {}...", username, window.since
    );

    match source.fetch_user_activity(username, window.since).await {
        Ok(activity) => {
            info!(
                commits = activity.commits.len(),
                pull_requests = activity.pull_requests.len(),
                issues = activity.issues.len(),
                "GitHub activity collected"
            );
            activity
        }
        Err(e) => {
            warn!(source = source.name(), "failed to collect GitHub activity: {:#}", e);
            GitHubActivity::default()
        }
    }
}

/// Build the configured [`ActivitySource`] backend.
pub fn build_source(config: &GitHubConfig, verbose: bool) -> anyhow::Result<Arc<dyn ActivitySource>> {
    Ok(match config.backend {
        GitHubBackend::Cli => Arc::new(GhCli::new(&config.gh_binary, config.limit, verbose)),
        GitHubBackend::Api => Arc::new(GhApi::new(config)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PullRequest;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct Fixed(Option<GitHubActivity>);

    #[async_trait]
    impl ActivitySource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_user_activity(&self, _: &str, _: NaiveDate) -> Result<GitHubActivity> {
            self.0
                .clone()
                .ok_or_else(|| anyhow::anyhow!("HTTP 403: rate limited"))
        }
    }

    fn window() -> ReportWindow {
        ReportWindow::ending(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 1).unwrap()
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let activity = fetch_activity(&Fixed(None), "octocat", &window()).await;
        assert!(activity.is_empty());
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let bundle = GitHubActivity {
            pull_requests: vec![PullRequest {
                number: 1,
                title: "Add cache".to_string(),
                state: "open".to_string(),
                url: None,
                repository: Some("org/r1".to_string()),
                additions: 40,
                deletions: 3,
            }],
            ..Default::default()
        };
        let activity = fetch_activity(&Fixed(Some(bundle.clone())), "octocat", &window()).await;
        assert_eq!(activity, bundle);
    }

    #[test]
    fn test_build_cli_source() {
        let source = build_source(&GitHubConfig::default(), false).unwrap();
        assert_eq!(source.name(), "gh-cli");
    }
}

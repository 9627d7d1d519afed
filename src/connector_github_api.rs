//! GitHub REST API connector.
//!
//! An [`ActivitySource`] that queries the search endpoints directly over
//! HTTPS instead of going through the `gh` binary. Useful on machines
//! without `gh` installed (CI runners, containers).
//!
//! # Configuration
//!
//! ```toml
//! [github]
//! backend = "api"
//! api_url = "https://api.github.com"   # GitHub Enterprise: https://host/api/v3
//! limit = 100
//! timeout_secs = 60
//! ```
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN` or `GH_TOKEN` — optional, but unauthenticated search is
//!   heavily rate limited.
//!
//! Only the first page (`per_page = limit`, capped at 100 by GitHub) is
//! requested for each search. A search answered with an error status or an
//! unreadable body contributes an empty list; a request that never reaches
//! the server fails the whole call.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::config::GitHubConfig;
use crate::connector_github::{parse_commits, parse_issues, parse_pull_requests};
use crate::models::GitHubActivity;
use crate::traits::ActivitySource;

const USER_AGENT: &str = concat!("gh-standup/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    items: Vec<T>,
}

/// [`ActivitySource`] backed by the GitHub REST search API.
pub struct GhApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    per_page: u32,
}

impl GhApi {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| std::env::var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            per_page: config.limit.min(100),
        })
    }

    async fn search<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> Result<Vec<T>> {
        let url = format!("{}/search/{}", self.base_url, endpoint);
        let per_page = self.per_page.to_string();

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .query(&[("q", query), ("per_page", per_page.as_str())]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GitHub search request failed: {}", url))?;

        match read_items(endpoint, response).await {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("{:#}", e);
                Ok(Vec::new())
            }
        }
    }
}

/// Items of a search response; non-2xx statuses are errors.
async fn read_items<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<Vec<T>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("GitHub search {} returned {}: {}", endpoint, status, body.trim());
    }

    let page: SearchPage<T> = response
        .json()
        .await
        .with_context(|| format!("Failed to parse GitHub search {} response", endpoint))?;
    Ok(page.items)
}

#[async_trait]
impl ActivitySource for GhApi {
    fn name(&self) -> &str {
        "github-api"
    }

    async fn fetch_user_activity(&self, username: &str, since: NaiveDate) -> Result<GitHubActivity> {
        let since = since.format("%Y-%m-%d").to_string();

        let commits = self
            .search(
                "commits",
                &format!("author:{} committer-date:>{}", username, since),
            )
            .await?;
        let prs = self
            .search(
                "issues",
                &format!("author:{} is:pr created:>{}", username, since),
            )
            .await?;
        let issues = self
            .search(
                "issues",
                &format!("author:{} is:issue created:>{}", username, since),
            )
            .await?;

        Ok(GitHubActivity {
            commits: parse_commits(commits),
            pull_requests: parse_pull_requests(prs),
            issues: parse_issues(issues),
        })
    }
}

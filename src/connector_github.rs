//! GitHub CLI connector.
//!
//! Implements [`ActivitySource`] on top of `gh search`. A single
//! [`fetch_user_activity`](ActivitySource::fetch_user_activity) call runs the
//! three searches (commits, pull requests, issues) without any repository
//! filter, so the result covers everything the user touched on GitHub.
//!
//! Each search degrades on its own: a failing or unparseable search logs a
//! warning and contributes an empty list, so a restricted commit search
//! does not hide pull requests and issues. Only a `gh` that cannot be
//! started at all fails the whole call.
//!
//! The JSON shapes accepted here are shared with the REST API backend in
//! [`crate::connector_github_api`]: both `gh` (`nameWithOwner`, `url`) and
//! the REST API (`full_name`, `html_url`, `repository_url`) field names are
//! understood.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::error::CommandError;
use crate::models::{Commit, GitHubActivity, Issue, PullRequest};
use crate::process::run_checked;
use crate::traits::ActivitySource;

/// [`ActivitySource`] backed by the `gh` binary.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    limit: u32,
    verbose: bool,
}

impl GhCli {
    pub fn new(program: &str, limit: u32, verbose: bool) -> Self {
        Self {
            program: program.to_string(),
            limit,
            verbose,
        }
    }

    async fn search(
        &self,
        kind: &str,
        filters: &[String],
        fields: &str,
    ) -> Result<String, CommandError> {
        let json = format!("--json={}", fields);
        let limit = format!("--limit={}", self.limit);
        let mut args: Vec<&str> = vec!["search", kind];
        args.extend(filters.iter().map(|f| f.as_str()));
        args.push(&json);
        args.push(&limit);

        let output = run_checked(&self.program, &args, None, self.verbose).await?;
        Ok(output.stdout)
    }

    /// Run one search and convert its items, or an empty list if the search
    /// fails. A `gh` that cannot be spawned is still an error.
    async fn search_items<R, T>(
        &self,
        kind: &str,
        filters: &[String],
        fields: &str,
        convert: fn(Vec<R>) -> Vec<T>,
    ) -> Result<Vec<T>, CommandError>
    where
        R: DeserializeOwned,
    {
        let stdout = match self.search(kind, filters, fields).await {
            Ok(stdout) => stdout,
            Err(e @ CommandError::Spawn { .. }) => return Err(e),
            Err(e) => {
                warn!("gh search {} failed: {}", kind, e);
                return Ok(Vec::new());
            }
        };
        match serde_json::from_str::<Vec<R>>(non_empty(&stdout)) {
            Ok(raw) => Ok(convert(raw)),
            Err(e) => {
                warn!("unparseable gh search {} output: {}", kind, e);
                Ok(Vec::new())
            }
        }
    }

    /// Login of the authenticated `gh` user.
    pub async fn current_user(&self) -> Result<String, CommandError> {
        let output = run_checked(
            &self.program,
            &["api", "user", "--jq", ".login"],
            None,
            self.verbose,
        )
        .await?;
        let login = output.stdout.trim().to_string();
        if login.is_empty() {
            return Err(CommandError::Output {
                command: "gh api user".to_string(),
                message: "empty login".to_string(),
            });
        }
        Ok(login)
    }
}

#[async_trait]
impl ActivitySource for GhCli {
    fn name(&self) -> &str {
        "gh-cli"
    }

    async fn fetch_user_activity(&self, username: &str, since: NaiveDate) -> Result<GitHubActivity> {
        let since = since.format("%Y-%m-%d").to_string();
        let author = format!("--author={}", username);

        let commits = self
            .search_items(
                "commits",
                &[author.clone(), format!("--committer-date=>{}", since)],
                "sha,commit,repository,url",
                parse_commits,
            )
            .await?;
        let pull_requests = self
            .search_items(
                "prs",
                &[author.clone(), format!("--created=>{}", since)],
                "number,title,state,url,repository",
                parse_pull_requests,
            )
            .await?;
        let issues = self
            .search_items(
                "issues",
                &[author, format!("--created=>{}", since)],
                "number,title,state,url,labels,repository",
                parse_issues,
            )
            .await?;

        Ok(GitHubActivity {
            commits,
            pull_requests,
            issues,
        })
    }
}

fn non_empty(json: &str) -> &str {
    if json.trim().is_empty() {
        "[]"
    } else {
        json
    }
}

// ─── Wire formats ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub(crate) struct RawRepository {
    #[serde(rename = "nameWithOwner", alias = "fullName", alias = "full_name")]
    name_with_owner: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct RawSignature {
    date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct RawCommitBody {
    message: Option<String>,
    author: Option<RawSignature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCommit {
    sha: Option<String>,
    commit: Option<RawCommitBody>,
    repository: Option<RawRepository>,
    #[serde(alias = "html_url")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLabel {
    name: Option<String>,
}

/// Shared shape of pull requests and issues in search results.
#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    number: Option<u64>,
    title: Option<String>,
    state: Option<String>,
    #[serde(alias = "html_url")]
    url: Option<String>,
    repository: Option<RawRepository>,
    repository_url: Option<String>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

impl RawIssue {
    fn repository(&self) -> Option<String> {
        self.repository
            .as_ref()
            .and_then(|r| r.name_with_owner.clone())
            .or_else(|| self.repository_url.as_deref().and_then(repo_from_api_url))
    }

    /// Items without a number, title, or state are dropped.
    fn is_complete(&self) -> bool {
        self.number.unwrap_or(0) > 0 && self.title.is_some() && self.state.is_some()
    }
}

/// `https://api.github.com/repos/owner/repo` → `owner/repo`.
fn repo_from_api_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/repos/")?;
    let rest = rest.trim_end_matches('/');
    if rest.split('/').count() == 2 {
        Some(rest.to_string())
    } else {
        None
    }
}

pub(crate) fn parse_commits(raw: Vec<RawCommit>) -> Vec<Commit> {
    raw.into_iter()
        .filter_map(|c| {
            let sha = c.sha?;
            let body = c.commit.unwrap_or_default();
            let message = body
                .message
                .as_deref()
                .and_then(|m| m.lines().next())
                .unwrap_or_default()
                .to_string();
            Some(Commit {
                sha,
                message,
                repository: c.repository.and_then(|r| r.name_with_owner),
                url: c.url,
                date: body.author.and_then(|a| a.date),
            })
        })
        .collect()
}

pub(crate) fn parse_pull_requests(raw: Vec<RawIssue>) -> Vec<PullRequest> {
    raw.into_iter()
        .filter(|i| i.is_complete())
        .map(|i| PullRequest {
            repository: i.repository(),
            number: i.number.unwrap_or_default(),
            title: i.title.unwrap_or_default(),
            state: i.state.unwrap_or_default(),
            url: i.url,
            additions: i.additions,
            deletions: i.deletions,
        })
        .collect()
}

pub(crate) fn parse_issues(raw: Vec<RawIssue>) -> Vec<Issue> {
    raw.into_iter()
        .filter(|i| i.is_complete())
        .map(|i| Issue {
            repository: i.repository(),
            number: i.number.unwrap_or_default(),
            title: i.title.unwrap_or_default(),
            state: i.state.unwrap_or_default(),
            url: i.url,
            labels: i.labels.into_iter().filter_map(|l| l.name).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gh_commits() {
        let json = r#"[
            {"sha": "abc123", "url": "https://github.com/org/r1/commit/abc123",
             "commit": {"message": "Fix login\n\nLong body", "author": {"date": "2026-10-17T10:00:00Z"}},
             "repository": {"fullName": "org/r1"}},
            {"commit": {"message": "no sha"}}
        ]"#;
        let commits = parse_commits(serde_json::from_str(json).unwrap());
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sha, "abc123");
        assert_eq!(commits[0].message, "Fix login");
        assert_eq!(commits[0].repository.as_deref(), Some("org/r1"));
        assert_eq!(commits[0].date.as_deref(), Some("2026-10-17T10:00:00Z"));
    }

    #[test]
    fn test_parse_gh_pull_requests_drops_incomplete() {
        let json = r#"[
            {"number": 12, "title": "Add cache", "state": "open", "additions": 40,
             "url": "https://github.com/org/r1/pull/12",
             "repository": {"name": "r1", "nameWithOwner": "org/r1"}},
            {"number": 0, "title": "bogus", "state": "open"},
            {"number": 13, "state": "open"}
        ]"#;
        let prs = parse_pull_requests(serde_json::from_str(json).unwrap());
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 12);
        assert_eq!(prs[0].repository.as_deref(), Some("org/r1"));
        assert_eq!((prs[0].additions, prs[0].deletions), (40, 0));
    }

    #[test]
    fn test_parse_api_issue_with_repository_url() {
        let json = r#"[
            {"number": 7, "title": "Crash on start", "state": "closed",
             "html_url": "https://github.com/org/r2/issues/7",
             "repository_url": "https://api.github.com/repos/org/r2",
             "labels": [{"name": "bug"}, {"name": null}]}
        ]"#;
        let issues = parse_issues(serde_json::from_str(json).unwrap());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].repository.as_deref(), Some("org/r2"));
        assert_eq!(issues[0].url.as_deref(), Some("https://github.com/org/r2/issues/7"));
        assert_eq!(issues[0].labels, vec!["bug".to_string()]);
    }

    #[test]
    fn test_repo_from_api_url() {
        assert_eq!(
            repo_from_api_url("https://api.github.com/repos/org/r2").as_deref(),
            Some("org/r2")
        );
        assert_eq!(repo_from_api_url("https://api.github.com/users/x"), None);
    }

    #[test]
    fn test_blank_output_is_empty_list() {
        assert_eq!(non_empty("  \n"), "[]");
    }

    /// Write an executable `gh` stand-in that dispatches on the search kind.
    #[cfg(unix)]
    fn fake_gh(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("gh");
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_restricted_commit_search_keeps_other_categories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gh = fake_gh(
            tmp.path(),
            r#"case "$2" in
  commits) echo "Commit search restricted" >&2; exit 1 ;;
  prs) echo '[{"number":7,"title":"Add cache","state":"open","url":"https://github.com/org/r1/pull/7","repository":{"nameWithOwner":"org/r1"}}]' ;;
  issues) echo 'not json' ;;
esac
"#,
        );

        let activity = GhCli::new(&gh, 50, false)
            .fetch_user_activity("octocat", since())
            .await
            .unwrap();
        assert!(activity.commits.is_empty());
        assert_eq!(activity.pull_requests.len(), 1);
        assert_eq!(activity.pull_requests[0].number, 7);
        assert!(activity.issues.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_search_arguments() {
        let tmp = tempfile::TempDir::new().unwrap();
        let log = tmp.path().join("args.log");
        let gh = fake_gh(
            tmp.path(),
            &format!("echo \"$@\" >> '{}'\necho '[]'\n", log.display()),
        );

        let activity = GhCli::new(&gh, 25, false)
            .fetch_user_activity("octocat", since())
            .await
            .unwrap();
        assert!(activity.is_empty());

        let calls = std::fs::read_to_string(&log).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("search commits --author=octocat --committer-date=>2026-10-17"));
        assert!(calls[1].starts_with("search prs --author=octocat --created=>2026-10-17"));
        assert!(calls[2].starts_with("search issues --author=octocat --created=>2026-10-17"));
        assert!(calls.iter().all(|c| c.ends_with("--limit=25")));
    }

    #[tokio::test]
    async fn test_missing_gh_fails_whole_call() {
        let result = GhCli::new("definitely-not-a-real-gh-xyz", 10, false)
            .fetch_user_activity("octocat", since())
            .await;
        assert!(result.is_err());
    }
}

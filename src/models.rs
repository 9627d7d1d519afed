//! Core data models used throughout gh-standup.
//!
//! These types represent the directories, per-directory git state, and
//! GitHub activity that flow through the aggregation pipeline. Everything
//! serializes with the field names downstream report layers expect
//! (`directoryId`, `localChanges`, ...).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A configured local working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDescriptor {
    pub id: String,
    pub path: PathBuf,
    /// Branch to compare against `origin/<branch>`. Resolved from `HEAD`
    /// when absent.
    pub branch: Option<String>,
    pub enabled: bool,
    pub remote_url: Option<String>,
    pub repo_name: Option<String>,
}

/// Uncommitted work in a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncommittedChanges {
    pub has_changes: bool,
    pub files_changed: usize,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub summary: String,
}

/// Local commits not yet on `origin/<branch>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpushedCommits {
    pub has_commits: bool,
    pub count: usize,
    pub commits: Vec<String>,
}

/// Outcome of collecting git state for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalChangeResult {
    pub directory_id: String,
    pub path: PathBuf,
    pub branch: Option<String>,
    pub uncommitted: UncommittedChanges,
    pub unpushed: UnpushedCommits,
}

impl LocalChangeResult {
    /// Degraded entry used when collection for `dir` failed.
    pub fn placeholder(dir: &DirectoryDescriptor) -> Self {
        Self {
            directory_id: dir.id.clone(),
            path: dir.path.clone(),
            branch: dir.branch.clone(),
            uncommitted: UncommittedChanges::default(),
            unpushed: UnpushedCommits::default(),
        }
    }
}

/// A commit authored by the user, as reported by GitHub search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    /// First line of the commit message.
    pub message: String,
    pub repository: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub url: Option<String>,
    pub repository: Option<String>,
    /// Line counts; 0 when the search result does not carry them.
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub url: Option<String>,
    pub repository: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Everything the user did on GitHub inside the report window, across all
/// repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubActivity {
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
    pub issues: Vec<Issue>,
}

impl GitHubActivity {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.pull_requests.is_empty() && self.issues.is_empty()
    }
}

/// Run metadata attached to an [`AggregatedActivity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
    pub user: String,
    pub days: u32,
    pub directory_count: usize,
    pub repo_count: usize,
    pub configured_repos: Vec<String>,
}

/// The single value produced by one aggregation run.
///
/// Fields are private so the value cannot be mutated once assembled;
/// consumers read it through the accessors or its JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedActivity {
    github_activity: GitHubActivity,
    local_changes: Vec<LocalChangeResult>,
    metadata: ActivityMetadata,
}

impl AggregatedActivity {
    pub(crate) fn new(
        github_activity: GitHubActivity,
        local_changes: Vec<LocalChangeResult>,
        metadata: ActivityMetadata,
    ) -> Self {
        Self {
            github_activity,
            local_changes,
            metadata,
        }
    }

    pub fn github_activity(&self) -> &GitHubActivity {
        &self.github_activity
    }

    pub fn local_changes(&self) -> &[LocalChangeResult] {
        &self.local_changes
    }

    pub fn metadata(&self) -> &ActivityMetadata {
        &self.metadata
    }
}

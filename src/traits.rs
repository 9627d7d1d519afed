//! Capability traits for the two external systems the pipeline talks to.
//!
//! The aggregation core never spawns `git` or `gh` itself. It goes through
//! [`GitQuery`] for local repository state and [`ActivitySource`] for
//! GitHub activity, so alternative backends (and test fakes) plug in
//! without touching the collector or the engine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │               Aggregator                 │
//! │  ┌──────────────┐   ┌─────────────────┐  │
//! │  │  GitQuery    │   │ ActivitySource  │  │
//! │  │  GitCli      │   │ GhCli / GhApi   │  │
//! │  └──────────────┘   └─────────────────┘  │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!        AggregatedActivity
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gh_standup::connector_git::GitCli;
//! use gh_standup::connector_github::GhCli;
//! use gh_standup::traits::{ActivitySource, GitQuery};
//!
//! let git: Arc<dyn GitQuery> = Arc::new(GitCli::new(false));
//! let github: Arc<dyn ActivitySource> = Arc::new(GhCli::new("gh", 100, false));
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

use crate::error::CommandError;
use crate::models::GitHubActivity;

// ═══════════════════════════════════════════════════════════════════════
// GitQuery Trait
// ═══════════════════════════════════════════════════════════════════════

/// Read-only queries against a local git working copy.
///
/// Implementations must be safe to call concurrently for different paths.
/// Each method either returns the relevant output lines or a
/// [`CommandError`]; the collector turns errors into placeholder results.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use std::path::Path;
/// use gh_standup::error::CommandError;
/// use gh_standup::traits::GitQuery;
///
/// struct CleanTree;
///
/// #[async_trait]
/// impl GitQuery for CleanTree {
///     async fn current_branch(&self, _: &Path) -> Result<String, CommandError> {
///         Ok("main".to_string())
///     }
///     async fn staged_files(&self, _: &Path) -> Result<Vec<String>, CommandError> {
///         Ok(vec![])
///     }
///     async fn unstaged_files(&self, _: &Path) -> Result<Vec<String>, CommandError> {
///         Ok(vec![])
///     }
///     async fn diff_stat(&self, _: &Path, _: bool) -> Result<Vec<String>, CommandError> {
///         Ok(vec![])
///     }
///     async fn unpushed_commits(
///         &self,
///         _: &Path,
///         _: &str,
///     ) -> Result<Option<Vec<String>>, CommandError> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait GitQuery: Send + Sync {
    /// Name of the checked-out branch (`git rev-parse --abbrev-ref HEAD`).
    async fn current_branch(&self, path: &Path) -> Result<String, CommandError>;

    /// Paths with staged changes (`git diff --cached --name-only`).
    async fn staged_files(&self, path: &Path) -> Result<Vec<String>, CommandError>;

    /// Paths with unstaged changes (`git diff --name-only`).
    async fn unstaged_files(&self, path: &Path) -> Result<Vec<String>, CommandError>;

    /// `git diff --stat` output lines; `staged` selects `--cached`.
    async fn diff_stat(&self, path: &Path, staged: bool) -> Result<Vec<String>, CommandError>;

    /// One line per commit on `HEAD` that is not on `origin/<branch>`.
    ///
    /// Returns `Ok(None)` when `origin/<branch>` does not exist (a
    /// local-only branch); that is "no data", not an error.
    async fn unpushed_commits(
        &self,
        path: &Path,
        branch: &str,
    ) -> Result<Option<Vec<String>>, CommandError>;
}

// ═══════════════════════════════════════════════════════════════════════
// ActivitySource Trait
// ═══════════════════════════════════════════════════════════════════════

/// Source of a user's GitHub activity across all repositories.
///
/// One call returns the whole bundle (commits, pull requests, issues) for
/// `username` since `since`. The aggregation engine calls this exactly once
/// per run, however many directories or repositories are configured.
/// Implementations return a single result page and do not paginate.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Short backend name used in log lines (e.g. `"gh-cli"`).
    fn name(&self) -> &str;

    async fn fetch_user_activity(
        &self,
        username: &str,
        since: NaiveDate,
    ) -> anyhow::Result<GitHubActivity>;
}

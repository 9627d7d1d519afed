//! Integration tests for the capability traits.
//!
//! These tests drive the public [`Aggregator`] with in-memory `GitQuery` and
//! `ActivitySource` implementations to check run-level behavior: one GitHub
//! fetch per run, degraded entries, omissions on timeout, and metadata.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use gh_standup::aggregate::Aggregator;
use gh_standup::config::{CollectionConfig, TimeoutPolicy};
use gh_standup::error::{AggregateError, CommandError};
use gh_standup::models::{Commit, DirectoryDescriptor, GitHubActivity};
use gh_standup::traits::{ActivitySource, GitQuery};
use gh_standup::window::ReportWindow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ─── Test GitQuery ──────────────────────────────────────────────────

/// Git backend where listed paths fail or hang; everything else has one
/// modified file and one unpushed commit.
#[derive(Default)]
struct ScriptedGit {
    failing: HashSet<PathBuf>,
    hanging: HashSet<PathBuf>,
}

#[async_trait]
impl GitQuery for ScriptedGit {
    async fn current_branch(&self, _path: &Path) -> Result<String, CommandError> {
        Ok("main".to_string())
    }

    async fn staged_files(&self, _path: &Path) -> Result<Vec<String>, CommandError> {
        Ok(vec![])
    }

    async fn unstaged_files(&self, path: &Path) -> Result<Vec<String>, CommandError> {
        if self.failing.contains(path) {
            return Err(CommandError::Failed {
                command: "git diff --name-only".to_string(),
                code: 128,
                stderr: "fatal: not a git repository".to_string(),
            });
        }
        if self.hanging.contains(path) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Ok(vec!["src/main.rs".to_string()])
    }

    async fn diff_stat(&self, _path: &Path, staged: bool) -> Result<Vec<String>, CommandError> {
        if staged {
            Ok(vec![])
        } else {
            Ok(vec![
                " src/main.rs | 3 ++-".to_string(),
                " 1 file changed, 2 insertions(+), 1 deletion(-)".to_string(),
            ])
        }
    }

    async fn unpushed_commits(
        &self,
        _path: &Path,
        _branch: &str,
    ) -> Result<Option<Vec<String>>, CommandError> {
        Ok(Some(vec!["1a2b3c4 Wire up cache".to_string()]))
    }
}

// ─── Test ActivitySource ────────────────────────────────────────────

/// Counts calls and records the arguments of the last one.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
    last: Mutex<Option<(String, NaiveDate)>>,
    fail: bool,
}

#[async_trait]
impl ActivitySource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch_user_activity(&self, username: &str, since: NaiveDate) -> Result<GitHubActivity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((username.to_string(), since));
        if self.fail {
            anyhow::bail!("gh: HTTP 502");
        }
        Ok(GitHubActivity {
            commits: vec![Commit {
                sha: "deadbeef".to_string(),
                message: "Ship it".to_string(),
                repository: Some("org/elsewhere".to_string()),
                url: None,
                date: None,
            }],
            ..Default::default()
        })
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn dir(id: &str, repo: Option<&str>) -> DirectoryDescriptor {
    DirectoryDescriptor {
        id: id.to_string(),
        path: PathBuf::from(format!("/work/{}", id)),
        branch: Some("main".to_string()),
        enabled: true,
        remote_url: None,
        repo_name: repo.map(str::to_string),
    }
}

fn collection(task_timeout_secs: u64) -> CollectionConfig {
    CollectionConfig {
        max_workers: 4,
        task_timeout_secs,
        on_timeout: TimeoutPolicy::Omit,
    }
}

fn window() -> ReportWindow {
    ReportWindow::ending(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 3).unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_shared_repos_fetch_github_once() {
    let source = Arc::new(CountingSource::default());
    let aggregator = Aggregator::new(
        Arc::new(ScriptedGit::default()),
        source.clone(),
        &collection(30),
    );
    let dirs = vec![
        dir("a", Some("org/r1")),
        dir("b", Some("org/r1")),
        dir("c", Some("org/r2")),
    ];

    let result = aggregator.run(&dirs, "octocat", &window()).await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *source.last.lock().unwrap(),
        Some((
            "octocat".to_string(),
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
        ))
    );

    let meta = result.metadata();
    assert_eq!(meta.repo_count, 2);
    assert_eq!(meta.configured_repos, vec!["org/r1", "org/r2"]);
    assert_eq!(meta.directory_count, 3);
    assert_eq!(meta.days, 3);

    let ids: Vec<&str> = result
        .local_changes()
        .iter()
        .map(|r| r.directory_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    // Activity outside the configured repos is kept.
    assert_eq!(result.github_activity().commits.len(), 1);
    assert_eq!(
        result.github_activity().commits[0].repository.as_deref(),
        Some("org/elsewhere")
    );

    let first = &result.local_changes()[0];
    assert!(first.uncommitted.has_changes);
    assert_eq!(first.uncommitted.summary, "1 file changed, 2 insertions(+), 1 deletion(-)");
    assert_eq!(first.unpushed.count, 1);
}

#[tokio::test]
async fn test_one_fetch_regardless_of_directory_count() {
    let source = Arc::new(CountingSource::default());
    let aggregator = Aggregator::new(
        Arc::new(ScriptedGit::default()),
        source.clone(),
        &collection(30),
    );
    let dirs: Vec<DirectoryDescriptor> = (0..12)
        .map(|i| dir(&format!("d{}", i), Some(&format!("org/r{}", i))))
        .collect();

    let result = aggregator.run(&dirs, "octocat", &window()).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.local_changes().len(), 12);
    assert_eq!(result.metadata().repo_count, 12);
}

#[tokio::test]
async fn test_failing_directory_gets_placeholder() {
    let git = ScriptedGit {
        failing: [PathBuf::from("/work/a")].into_iter().collect(),
        ..Default::default()
    };
    let aggregator = Aggregator::new(
        Arc::new(git),
        Arc::new(CountingSource::default()),
        &collection(30),
    );
    let dirs = vec![dir("a", Some("org/r1")), dir("b", Some("org/r1"))];

    let result = aggregator.run(&dirs, "octocat", &window()).await.unwrap();
    assert_eq!(result.local_changes().len(), 2);

    let a = &result.local_changes()[0];
    assert_eq!(a.directory_id, "a");
    assert!(!a.uncommitted.has_changes);
    assert_eq!(a.uncommitted.files_changed, 0);
    assert!(!a.unpushed.has_commits);
}

#[tokio::test]
async fn test_timed_out_directory_is_omitted() {
    let git = ScriptedGit {
        hanging: [PathBuf::from("/work/b")].into_iter().collect(),
        ..Default::default()
    };
    let aggregator = Aggregator::new(
        Arc::new(git),
        Arc::new(CountingSource::default()),
        &collection(1),
    );
    let dirs = vec![
        dir("a", Some("org/r1")),
        dir("b", Some("org/r1")),
        dir("c", Some("org/r2")),
    ];

    let result = aggregator.run(&dirs, "octocat", &window()).await.unwrap();
    let ids: Vec<&str> = result
        .local_changes()
        .iter()
        .map(|r| r.directory_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
    // Metadata still describes the input, not the survivors.
    assert_eq!(result.metadata().directory_count, 3);
}

#[tokio::test]
async fn test_github_failure_yields_empty_bundle() {
    let source = Arc::new(CountingSource {
        fail: true,
        ..Default::default()
    });
    let aggregator = Aggregator::new(
        Arc::new(ScriptedGit::default()),
        source.clone(),
        &collection(30),
    );

    let result = aggregator
        .run(&[dir("a", Some("org/r1"))], "octocat", &window())
        .await
        .unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(result.github_activity().is_empty());
    assert_eq!(result.local_changes().len(), 1);
}

#[tokio::test]
async fn test_unnamed_repos_not_counted() {
    let aggregator = Aggregator::new(
        Arc::new(ScriptedGit::default()),
        Arc::new(CountingSource::default()),
        &collection(30),
    );
    let dirs = vec![dir("a", None), dir("b", Some("")), dir("c", Some("org/r1"))];

    let result = aggregator.run(&dirs, "octocat", &window()).await.unwrap();
    assert_eq!(result.metadata().repo_count, 1);
    assert_eq!(result.metadata().configured_repos, vec!["org/r1"]);
    assert_eq!(result.local_changes().len(), 3);
}

#[tokio::test]
async fn test_empty_directory_list_never_collects() {
    let source = Arc::new(CountingSource::default());
    let aggregator = Aggregator::new(
        Arc::new(ScriptedGit::default()),
        source.clone(),
        &collection(30),
    );

    let err = aggregator.run(&[], "octocat", &window()).await.unwrap_err();
    assert!(matches!(err, AggregateError::NoDirectories));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

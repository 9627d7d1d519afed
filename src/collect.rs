//! Local change collection across configured directories.
//!
//! Each directory is processed by its own tokio task; a semaphore with
//! `min(directories, max_workers)` permits bounds how many run at once.
//! Every task is wrapped in a per-task timeout. When it fires, the task's
//! future is dropped and any git subprocess it was awaiting is killed
//! (see [`crate::process`]).
//!
//! Failure handling:
//!
//! | Outcome | Result entry |
//! |---------|--------------|
//! | success | collected state |
//! | git error or panic | placeholder (empty state), warning logged |
//! | timeout | omitted, warning logged (or placeholder with `on_timeout = "placeholder"`) |
//!
//! Results come back in input order no matter which task finishes first.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{CollectionConfig, TimeoutPolicy};
use crate::error::CommandError;
use crate::models::{DirectoryDescriptor, LocalChangeResult, UncommittedChanges, UnpushedCommits};
use crate::traits::GitQuery;

/// What `git rev-parse --abbrev-ref HEAD` prints when no branch is checked out.
const DETACHED_HEAD: &str = "HEAD";

enum Outcome {
    Done(LocalChangeResult),
    Failed(CommandError),
    TimedOut,
}

/// Collects uncommitted and unpushed state for a set of directories.
pub struct LocalChangeCollector {
    git: Arc<dyn GitQuery>,
    max_workers: usize,
    task_timeout: Duration,
    on_timeout: TimeoutPolicy,
}

impl LocalChangeCollector {
    pub fn new(
        git: Arc<dyn GitQuery>,
        max_workers: usize,
        task_timeout: Duration,
        on_timeout: TimeoutPolicy,
    ) -> Self {
        Self {
            git,
            max_workers: max_workers.max(1),
            task_timeout,
            on_timeout,
        }
    }

    pub fn from_config(git: Arc<dyn GitQuery>, config: &CollectionConfig) -> Self {
        Self::new(
            git,
            config.max_workers,
            Duration::from_secs(config.task_timeout_secs),
            config.on_timeout,
        )
    }

    /// Number of directories processed concurrently for `count` inputs.
    pub fn pool_size(&self, count: usize) -> usize {
        count.min(self.max_workers)
    }

    /// Collect state for every directory in `dirs`.
    ///
    /// Never fails: per-directory problems degrade to placeholders or
    /// omissions. The output holds at most one entry per input, in input
    /// order.
    pub async fn collect(&self, dirs: &[DirectoryDescriptor]) -> Vec<LocalChangeResult> {
        if dirs.is_empty() {
            return Vec::new();
        }

        let workers = self.pool_size(dirs.len());
        info!("Collecting local changes (parallel with {} workers)...", workers);

        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        let mut index_of = HashMap::new();

        for (index, dir) in dirs.iter().cloned().enumerate() {
            let git = Arc::clone(&self.git);
            let permits = Arc::clone(&permits);
            let task_timeout = self.task_timeout;

            let handle = tasks.spawn(async move {
                // Held until the task ends; the semaphore is never closed.
                let _permit = permits.acquire_owned().await;
                let outcome =
                    match tokio::time::timeout(task_timeout, collect_directory(git.as_ref(), &dir))
                        .await
                    {
                        Ok(Ok(result)) => Outcome::Done(result),
                        Ok(Err(e)) => Outcome::Failed(e),
                        Err(_) => Outcome::TimedOut,
                    };
                (index, outcome)
            });
            index_of.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<LocalChangeResult>> = vec![None; dirs.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Outcome::Done(result))) => {
                    debug!(id = %dirs[index].id, "local changes collected");
                    slots[index] = Some(result);
                }
                Ok((index, Outcome::Failed(e))) => {
                    let dir = &dirs[index];
                    warn!(id = %dir.id, "failed to collect local changes: {}", e);
                    slots[index] = Some(LocalChangeResult::placeholder(dir));
                }
                Ok((index, Outcome::TimedOut)) => {
                    let dir = &dirs[index];
                    match self.on_timeout {
                        TimeoutPolicy::Omit => {
                            warn!(
                                id = %dir.id,
                                "local changes detection timed out after {:?} (skipping)",
                                self.task_timeout
                            );
                        }
                        TimeoutPolicy::Placeholder => {
                            warn!(
                                id = %dir.id,
                                "local changes detection timed out after {:?}",
                                self.task_timeout
                            );
                            slots[index] = Some(LocalChangeResult::placeholder(dir));
                        }
                    }
                }
                Err(e) => {
                    if let Some(&index) = index_of.get(&e.id()) {
                        let dir = &dirs[index];
                        warn!(id = %dir.id, "local changes task aborted: {}", e);
                        slots[index] = Some(LocalChangeResult::placeholder(dir));
                    }
                }
            }
        }

        slots.into_iter().flatten().collect()
    }
}

/// Query uncommitted and unpushed state for one directory.
pub async fn collect_directory(
    git: &dyn GitQuery,
    dir: &DirectoryDescriptor,
) -> Result<LocalChangeResult, CommandError> {
    let path = dir.path.as_path();

    let unstaged = git.unstaged_files(path).await?;
    let staged = git.staged_files(path).await?;

    let has_changes = !unstaged.is_empty() || !staged.is_empty();
    let files_changed = unstaged
        .iter()
        .chain(staged.iter())
        .collect::<BTreeSet<_>>()
        .len();

    let summary = if has_changes {
        let mut stat = git.diff_stat(path, false).await?;
        stat.extend(git.diff_stat(path, true).await?);
        stat_summary(&stat)
    } else {
        String::new()
    };

    let branch = match &dir.branch {
        Some(branch) => branch.clone(),
        None => git.current_branch(path).await?,
    };

    // A detached HEAD has no upstream to compare against.
    let unpushed = if branch == DETACHED_HEAD {
        debug!(id = %dir.id, "detached HEAD, skipping unpushed commits");
        UnpushedCommits::default()
    } else {
        match git.unpushed_commits(path, &branch).await? {
            Some(commits) if !commits.is_empty() => UnpushedCommits {
                has_commits: true,
                count: commits.len(),
                commits,
            },
            _ => UnpushedCommits::default(),
        }
    };

    Ok(LocalChangeResult {
        directory_id: dir.id.clone(),
        path: dir.path.clone(),
        branch: Some(branch),
        uncommitted: UncommittedChanges {
            has_changes,
            files_changed,
            staged,
            unstaged,
            summary,
        },
        unpushed,
    })
}

/// Last line mentioning "changed", "insertion" or "deletion".
///
/// Matches the `N files changed, X insertions(+), Y deletions(-)` footer of
/// `git diff --stat`. Plain text match, no diff parsing.
pub(crate) fn stat_summary(lines: &[String]) -> String {
    lines
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| l.contains("changed") || l.contains("insertion") || l.contains("deletion"))
        .unwrap_or_default()
        .to_string()
}

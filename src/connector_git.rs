//! Git CLI connector.
//!
//! Implements [`GitQuery`] by shelling out to `git -C <path> ...` through the
//! cancellable runner in [`crate::process`]. Also hosts the remote-URL
//! parsing used to derive `owner/repo` names for configured directories.

use async_trait::async_trait;
use std::path::Path;

use crate::error::CommandError;
use crate::process::{run, run_checked};
use crate::traits::GitQuery;

/// [`GitQuery`] backed by the `git` binary on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    verbose: bool,
}

impl GitCli {
    /// `verbose` logs every git invocation at debug level.
    pub fn new(verbose: bool) -> Self {
        Self {
            program: "git".to_string(),
            verbose,
        }
    }

    async fn lines(&self, path: &Path, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let dir = path.to_string_lossy();
        let mut full = vec!["-C", dir.as_ref()];
        full.extend_from_slice(args);
        let output = run_checked(&self.program, &full, None, self.verbose).await?;
        Ok(output.lines())
    }
}

#[async_trait]
impl GitQuery for GitCli {
    async fn current_branch(&self, path: &Path) -> Result<String, CommandError> {
        let lines = self
            .lines(path, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await?;
        lines
            .into_iter()
            .next()
            .map(|l| l.trim().to_string())
            .ok_or_else(|| CommandError::Output {
                command: "git rev-parse --abbrev-ref HEAD".to_string(),
                message: "empty output".to_string(),
            })
    }

    async fn staged_files(&self, path: &Path) -> Result<Vec<String>, CommandError> {
        self.lines(path, &["diff", "--cached", "--name-only"]).await
    }

    async fn unstaged_files(&self, path: &Path) -> Result<Vec<String>, CommandError> {
        self.lines(path, &["diff", "--name-only"]).await
    }

    async fn diff_stat(&self, path: &Path, staged: bool) -> Result<Vec<String>, CommandError> {
        if staged {
            self.lines(path, &["diff", "--cached", "--stat"]).await
        } else {
            self.lines(path, &["diff", "--stat"]).await
        }
    }

    async fn unpushed_commits(
        &self,
        path: &Path,
        branch: &str,
    ) -> Result<Option<Vec<String>>, CommandError> {
        let remote_ref = format!("origin/{}", branch);
        let dir = path.to_string_lossy();

        // A failing verify means the branch was never pushed.
        let verify = run(
            &self.program,
            &["-C", dir.as_ref(), "rev-parse", "--verify", "--quiet", &remote_ref],
            None,
            self.verbose,
        )
        .await?;
        if !verify.success() {
            tracing::debug!(path = %path.display(), "no remote branch '{}' (local-only)", remote_ref);
            return Ok(None);
        }

        let range = format!("{}..HEAD", remote_ref);
        let commits = self
            .lines(path, &["log", &range, "--format=%h %s"])
            .await?;
        Ok(Some(commits))
    }
}

/// Extract `owner/repo` from a git remote URL.
///
/// Handles the SSH (`git@github.com:owner/repo.git`) and HTTP(S)
/// (`https://github.com/owner/repo`) forms. Returns `None` when the URL
/// carries no `owner/repo` path.
pub fn parse_repo_name(remote_url: &str) -> Option<String> {
    let url = remote_url.trim();
    if url.is_empty() {
        return None;
    }

    let path = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':').map(|(_, p)| p)?
    } else if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("ssh://"))
    {
        rest.split_once('/').map(|(_, p)| p)?
    } else {
        return None;
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, name) = path.split_once('/')?;
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("{}/{}", owner, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssh_remote() {
        assert_eq!(
            parse_repo_name("git@github.com:org/api.git").as_deref(),
            Some("org/api")
        );
    }

    #[test]
    fn test_parse_https_remote() {
        assert_eq!(
            parse_repo_name("https://github.com/org/api").as_deref(),
            Some("org/api")
        );
        assert_eq!(
            parse_repo_name("https://github.com/org/api.git/").as_deref(),
            Some("org/api")
        );
    }

    #[test]
    fn test_parse_ssh_scheme_remote() {
        assert_eq!(
            parse_repo_name("ssh://git@github.com/org/api.git").as_deref(),
            Some("org/api")
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_repo_name(""), None);
        assert_eq!(parse_repo_name("/local/path/repo"), None);
        assert_eq!(parse_repo_name("https://github.com/"), None);
        assert_eq!(parse_repo_name("https://github.com/only-owner"), None);
    }
}

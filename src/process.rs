//! Cancellable subprocess execution.
//!
//! Every external command runs as a `tokio::process` child with
//! `kill_on_drop` set. Dropping the future returned by [`run`] (for example
//! when an enclosing `tokio::time::timeout` expires) kills the child instead
//! of leaving it running in the background.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::CommandError;

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Non-blank stdout lines.
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect()
    }
}

/// Run `program args...`, optionally inside `dir`, and capture its output.
///
/// A non-zero exit is *not* an error here; callers decide whether it means
/// "no data" or a failure (see [`run_checked`]).
pub async fn run(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    verbose: bool,
) -> Result<CommandOutput, CommandError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    if verbose {
        tracing::debug!(
            dir = %dir.map(|d| d.display().to_string()).unwrap_or_default(),
            "exec: {} {}",
            program,
            args.join(" ")
        );
    }

    let output = cmd.output().await.map_err(|source| CommandError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let result = CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if verbose {
        tracing::debug!(
            code = result.code,
            stdout_bytes = result.stdout.len(),
            "exit: {}",
            program
        );
    }

    Ok(result)
}

/// Like [`run`], but a non-zero exit becomes [`CommandError::Failed`].
pub async fn run_checked(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    verbose: bool,
) -> Result<CommandOutput, CommandError> {
    let output = run(program, args, dir, verbose).await?;
    if !output.success() {
        return Err(CommandError::Failed {
            command: format!("{} {}", program, args.join(" ")),
            code: output.code,
            stderr: output.stderr,
        });
    }
    Ok(output)
}

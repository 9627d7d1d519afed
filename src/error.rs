//! Typed errors for subprocess invocation and the aggregation precondition.

use thiserror::Error;

/// A failed external command (`git`, `gh`).
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to execute '{program}'. Is it installed? ({source})")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with status {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("'{command}' produced unparseable output: {message}")]
    Output { command: String, message: String },
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no valid directories to process")]
    NoDirectories,
}

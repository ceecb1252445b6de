use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while executing external commands.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The binary was not found on the search path.
    #[error("command not found: {command}")]
    BinaryNotFound { command: String },
    /// The process could not be started for another reason.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    /// Polling the child process failed.
    #[error("failed to monitor '{command}': {source}")]
    Monitor {
        command: String,
        #[source]
        source: io::Error,
    },
    /// The command did not finish within its timeout and was killed.
    #[error("'{command}' timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },
    /// A fail-fast run exited with a non-zero status.
    #[error("'{command}' failed with exit code {}\n{output}", code.map_or_else(|| "unknown".to_owned(), |code| code.to_string()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },
    /// A log file for a background process could not be created.
    #[error("failed to create log file '{path}': {source}")]
    RedirectLog {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

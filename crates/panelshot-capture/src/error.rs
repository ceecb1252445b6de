use std::io;

use camino::Utf8PathBuf;
use panelshot_exec::ExecError;
use thiserror::Error;

/// Errors raised while coordinating a capture run.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A worker input or artifact file could not be read or written.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The capture job could not be serialized.
    #[error("failed to serialize capture job: {source}")]
    Job {
        #[source]
        source: serde_json::Error,
    },
    /// A screenshot URL could not be resolved against the base URL.
    #[error("invalid screenshot url '{value}': {source}")]
    ScreenshotUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// Installing worker dependencies or spawning the worker failed.
    #[error(transparent)]
    Exec(#[from] ExecError),
    /// The worker exited non-zero; carries its error stream.
    #[error("capture worker failed with exit code {}\n{stderr}", code.map_or_else(|| "unknown".to_owned(), |code| code.to_string()))]
    Worker { code: Option<i32>, stderr: String },
}

use std::io;

use camino::Utf8PathBuf;
use panelshot_exec::ExecError;
use thiserror::Error;

/// Errors raised across the project lifecycle.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// An external command failed; carries command, exit code, and output.
    #[error(transparent)]
    Exec(#[from] ExecError),
    /// A project file could not be read or written.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The scaffolded project's composer.json is not valid JSON.
    #[error("failed to parse '{path}': {source}")]
    ComposerManifest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// No panel provider matched the configured panel identifier.
    #[error("no panel provider found for panel '{panel}'")]
    PanelProviderNotFound { panel: String },
    /// The dev server failed to start or never became reachable.
    #[error("server failed to start: {reason}\n--- stdout tail ---\n{stdout_tail}\n--- stderr tail ---\n{stderr_tail}")]
    ServerStart {
        reason: String,
        stdout_tail: String,
        stderr_tail: String,
    },
    /// A derived base URL is not parseable.
    #[error("invalid base url '{value}': {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

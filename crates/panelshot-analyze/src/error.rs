use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while analyzing a plugin directory.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The plugin directory carries no `composer.json`.
    #[error("no composer.json found at '{path}'")]
    ManifestMissing { path: Utf8PathBuf },
    /// The dependency manifest exists but could not be read.
    #[error("failed to read '{path}': {source}")]
    ManifestRead {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The dependency manifest is not valid JSON.
    #[error("failed to parse '{path}': {source}")]
    ManifestParse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

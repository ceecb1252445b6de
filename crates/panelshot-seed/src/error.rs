use std::io;

use camino::Utf8PathBuf;
use panelshot_exec::ExecError;
use thiserror::Error;

/// Errors raised while writing or running generated seed code.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A generated source file could not be written.
    #[error("failed to write seed unit '{path}': {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Running the master seeder through artisan failed.
    #[error("seeding failed: {source}")]
    Run {
        #[from]
        source: ExecError,
    },
}

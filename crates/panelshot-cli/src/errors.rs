//! Error type for the binary's top level.

use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use panelshot_analyze::AnalysisError;
use panelshot_capture::CaptureError;
use panelshot_config::ManifestError;
use panelshot_project::ProjectError;
use panelshot_readme::ReadmeError;
use panelshot_seed::SeedError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Readme(#[from] ReadmeError),
    #[error("no project found at '{path}'; run `panelshot setup` first")]
    ProjectMissing { path: Utf8PathBuf },
    #[error("unknown theme '{requested}'; available: {available}")]
    UnknownTheme {
        requested: String,
        available: String,
    },
}

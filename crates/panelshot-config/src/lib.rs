//! Configuration surfaces for the panelshot toolchain.
//!
//! Two distinct inputs live here. The runtime [`Config`] controls how the
//! tool itself behaves (binary paths, server host/port, temp directory,
//! logging) and is layered from defaults, `PANELSHOT_*` environment
//! variables, and command-line flags via `ortho_config`. The per-plugin
//! [`Manifest`] (`panelshot.json`) describes what to capture for one plugin
//! and is validated as raw JSON before typed deserialization so every
//! violation is reported together.

pub mod defaults;
mod logging;
mod manifest;
mod provider;
mod runtime;

pub use logging::{LogFormat, LogFormatParseError};
pub use manifest::{
    BeforeAction, BeforeActionKind, CropRect, ImageFormat, InstallSection, KitSection, Manifest,
    ModelSeed, OutputSection, PluginRegistration, PluginSection, ReadmeSection, ReadmeTemplate,
    ScreenshotSpec, SeedSection, Theme, UserSection, Viewport,
};
pub use provider::{MANIFEST_FILE, ManifestError, manifest_path, validate_document};
pub use runtime::{Config, HerdConfig, HerdMode, ServerConfig};

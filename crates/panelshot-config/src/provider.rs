//! Loading, saving, and validating `panelshot.json`.
//!
//! Validation runs over the raw JSON document and collects every violation
//! before typed deserialization, so a user fixing their manifest sees all
//! problems in one pass rather than one per run.

use std::fs;
use std::io;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use thiserror::Error;

use crate::manifest::{ImageFormat, Manifest, Theme};

/// Manifest file name looked up in the plugin directory.
pub const MANIFEST_FILE: &str = "panelshot.json";

/// Path of the manifest inside `plugin_dir`.
#[must_use]
pub fn manifest_path(plugin_dir: &Utf8Path) -> Utf8PathBuf {
    plugin_dir.join(MANIFEST_FILE)
}

impl Manifest {
    /// Reports whether `plugin_dir` carries a manifest.
    #[must_use]
    pub fn exists(plugin_dir: &Utf8Path) -> bool {
        manifest_path(plugin_dir).is_file()
    }

    /// Loads and validates the manifest from `plugin_dir`.
    pub fn load(plugin_dir: &Utf8Path) -> Result<Self, ManifestError> {
        let path = manifest_path(plugin_dir);
        let text = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound { path: path.clone() }
            } else {
                ManifestError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let document: Value = serde_json::from_str(&text).map_err(|source| {
            ManifestError::Parse {
                path: path.clone(),
                source,
            }
        })?;

        let violations = validate_document(&document);
        if !violations.is_empty() {
            return Err(ManifestError::Invalid { path, violations });
        }

        serde_json::from_value(document).map_err(|source| ManifestError::Parse { path, source })
    }

    /// Writes the manifest to `plugin_dir` as pretty JSON with a trailing
    /// newline.
    pub fn save(&self, plugin_dir: &Utf8Path) -> Result<(), ManifestError> {
        let path = manifest_path(plugin_dir);
        let mut text =
            serde_json::to_string_pretty(self).map_err(|source| ManifestError::Serialize {
                path: path.clone(),
                source,
            })?;
        text.push('\n');
        fs::write(&path, text).map_err(|source| ManifestError::Write { path, source })
    }
}

/// Validates a raw manifest document, returning every violation found.
///
/// An empty result means the document deserializes into [`Manifest`] without
/// losing any closed-set guarantee.
#[must_use]
pub fn validate_document(document: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    match document.get("plugin") {
        None => violations.push("Missing required field: plugin".to_owned()),
        Some(plugin) => {
            if !has_nonempty_string(plugin, "name") {
                violations.push("Missing required field: plugin.name".to_owned());
            }
            if !has_nonempty_string(plugin, "package") {
                violations.push("Missing required field: plugin.package".to_owned());
            }
        }
    }

    match document.get("screenshots") {
        None => {}
        Some(Value::Array(entries)) => {
            for (index, entry) in entries.iter().enumerate() {
                if !has_nonempty_string(entry, "name") {
                    violations.push(format!("Missing required field: screenshots[{index}].name"));
                }
                if !has_nonempty_string(entry, "url") {
                    violations.push(format!("Missing required field: screenshots[{index}].url"));
                }
            }
        }
        Some(_) => violations.push("Field \"screenshots\" must be an array".to_owned()),
    }

    if let Some(themes) = document.pointer("/output/themes").and_then(Value::as_array) {
        for theme in themes {
            let text = theme.as_str().unwrap_or_default();
            if Theme::from_str(text).is_err() {
                violations.push(format!("Invalid theme: {text}. Must be one of: light, dark"));
            }
        }
    }

    if let Some(format) = document.pointer("/output/format").and_then(Value::as_str) {
        if ImageFormat::from_str(format).is_err() {
            violations.push(format!(
                "Invalid format: {format}. Must be one of: png, jpg, webp"
            ));
        }
    }

    violations
}

fn has_nonempty_string(container: &Value, key: &str) -> bool {
    container
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|text| !text.is_empty())
}

/// Errors raised by the manifest provider.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest file exists in the plugin directory.
    #[error("no {MANIFEST_FILE} found at '{path}'")]
    NotFound { path: Utf8PathBuf },
    /// The manifest exists but could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The manifest is not valid JSON or does not match the schema.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The manifest parsed but violates validation rules.
    #[error("invalid manifest at '{path}': {}", violations.join("; "))]
    Invalid {
        path: Utf8PathBuf,
        violations: Vec<String>,
    },
    /// The manifest could not be serialized for saving.
    #[error("failed to serialize manifest for '{path}': {source}")]
    Serialize {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The manifest file could not be written.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

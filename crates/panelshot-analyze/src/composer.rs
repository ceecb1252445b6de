//! Dependency-manifest parsing and framework version detection.

use std::fs;
use std::io;

use camino::Utf8Path;
use serde_json::Value;
use strum::Display;
use tracing::debug;

use crate::error::AnalysisError;

/// Log target for manifest operations.
const COMPOSER_TARGET: &str = "panelshot_analyze::composer";

/// Packages whose version constraint reveals the Filament major version.
const FRAMEWORK_PACKAGES: [&str; 5] = [
    "filament/filament",
    "filament/support",
    "filament/forms",
    "filament/tables",
    "filament/panels",
];

/// Detected host-framework major version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum FrameworkVersion {
    /// Filament 3.x.
    #[strum(serialize = "3")]
    V3,
    /// Filament 4.x.
    #[strum(serialize = "4")]
    V4,
    /// Filament 5.x.
    #[strum(serialize = "5")]
    V5,
    /// No known package or constraint matched; never guessed.
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl FrameworkVersion {
    /// Maps a version-constraint string to a major version.
    ///
    /// A constraint beginning `^N` or `N.` maps to major version N; anything
    /// else is [`FrameworkVersion::Unknown`].
    #[must_use]
    pub fn from_constraint(constraint: &str) -> Self {
        let trimmed = constraint.trim();
        for (version, major) in [(Self::V3, '3'), (Self::V4, '4'), (Self::V5, '5')] {
            let caret = format!("^{major}");
            let dotted = format!("{major}.");
            if trimmed.starts_with(&caret) || trimmed.starts_with(&dotted) {
                return version;
            }
        }
        Self::Unknown
    }
}

/// Parsed `composer.json` facts the analyzer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerManifest {
    /// Package identifier from the `name` key, or `"unknown"`.
    pub package: String,
    /// Framework version detected from `require` then `require-dev`.
    pub framework_version: FrameworkVersion,
}

/// Loads and interprets the plugin's `composer.json`.
pub fn read_manifest(plugin_dir: &Utf8Path) -> Result<ComposerManifest, AnalysisError> {
    let path = plugin_dir.join("composer.json");
    let text = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            AnalysisError::ManifestMissing { path: path.clone() }
        } else {
            AnalysisError::ManifestRead {
                path: path.clone(),
                source,
            }
        }
    })?;
    let document: Value = serde_json::from_str(&text)
        .map_err(|source| AnalysisError::ManifestParse { path, source })?;

    let package = document
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();
    let framework_version = detect_version(&document);

    debug!(
        target: COMPOSER_TARGET,
        package,
        version = %framework_version,
        "composer manifest read"
    );

    Ok(ComposerManifest {
        package,
        framework_version,
    })
}

fn detect_version(document: &Value) -> FrameworkVersion {
    for section in ["require", "require-dev"] {
        let Some(dependencies) = document.get(section).and_then(Value::as_object) else {
            continue;
        };
        for package in FRAMEWORK_PACKAGES {
            let Some(constraint) = dependencies.get(package).and_then(Value::as_str) else {
                continue;
            };
            let version = FrameworkVersion::from_constraint(constraint);
            if version != FrameworkVersion::Unknown {
                return version;
            }
        }
    }
    FrameworkVersion::Unknown
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "tests use expect for fixture setup clarity"
    )]

    use rstest::rstest;

    use super::*;

    fn write_manifest(dir: &Utf8Path, text: &str) {
        fs::write(dir.join("composer.json"), text).expect("write composer.json");
    }

    fn temp_plugin() -> (tempfile::TempDir, camino::Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = camino::Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");
        (temp, dir)
    }

    #[rstest]
    #[case("^3.2", FrameworkVersion::V3)]
    #[case("3.0.1", FrameworkVersion::V3)]
    #[case("^4.0", FrameworkVersion::V4)]
    #[case("^5", FrameworkVersion::V5)]
    #[case("5.x-dev", FrameworkVersion::V5)]
    #[case("dev-main", FrameworkVersion::Unknown)]
    #[case("*", FrameworkVersion::Unknown)]
    fn constraints_map_to_major_versions(
        #[case] constraint: &str,
        #[case] expected: FrameworkVersion,
    ) {
        assert_eq!(FrameworkVersion::from_constraint(constraint), expected);
    }

    #[test]
    fn require_dev_is_consulted_after_require() {
        let (_temp, dir) = temp_plugin();
        write_manifest(
            &dir,
            r#"{"name": "acme/blog", "require-dev": {"filament/filament": "^4.0"}}"#,
        );
        let manifest = read_manifest(&dir).expect("manifest should read");
        assert_eq!(manifest.package, "acme/blog");
        assert_eq!(manifest.framework_version, FrameworkVersion::V4);
    }

    #[test]
    fn unknown_packages_yield_unknown_version() {
        let (_temp, dir) = temp_plugin();
        write_manifest(&dir, r#"{"name": "acme/blog", "require": {"php": "^8.2"}}"#);
        let manifest = read_manifest(&dir).expect("manifest should read");
        assert_eq!(manifest.framework_version, FrameworkVersion::Unknown);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let (_temp, dir) = temp_plugin();
        let error = read_manifest(&dir).expect_err("missing manifest must fail");
        assert!(matches!(error, AnalysisError::ManifestMissing { .. }));
    }

    #[test]
    fn unparseable_manifest_is_an_error() {
        let (_temp, dir) = temp_plugin();
        write_manifest(&dir, "{not json");
        let error = read_manifest(&dir).expect_err("bad manifest must fail");
        assert!(matches!(error, AnalysisError::ManifestParse { .. }));
    }
}

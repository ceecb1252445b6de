//! Moving captured artifacts into the plugin's output tree.

use std::fs;

use camino::Utf8Path;
use panelshot_config::OutputSection;
use tracing::{debug, warn};

use crate::error::CaptureError;
use crate::events::CaptureResult;

/// Log target for relocation.
const RELOCATE_TARGET: &str = "panelshot_capture::relocate";

/// Copies every successful artifact from the project into the plugin under
/// `{directory}/{theme}/{name}.{format}` and rewrites the result's path to
/// the plugin-relative form. Failed results pass through unchanged.
pub fn relocate_results(
    results: Vec<CaptureResult>,
    project_dir: &Utf8Path,
    plugin_dir: &Utf8Path,
    output: &OutputSection,
) -> Result<Vec<CaptureResult>, CaptureError> {
    results
        .into_iter()
        .map(|result| relocate_one(result, project_dir, plugin_dir, output))
        .collect()
}

fn relocate_one(
    mut result: CaptureResult,
    project_dir: &Utf8Path,
    plugin_dir: &Utf8Path,
    output: &OutputSection,
) -> Result<CaptureResult, CaptureError> {
    if !result.success {
        return Ok(result);
    }

    let file_name = format!("{}.{}", result.name, output.format.extension());
    let relative = format!("{}/{}/{file_name}", output.directory, result.theme);
    let source = project_dir.join(&result.path);
    let destination = plugin_dir.join(&relative);

    if !source.is_file() {
        // The worker reported success but the artifact is gone; degrade the
        // result instead of failing the whole run.
        warn!(target: RELOCATE_TARGET, %source, "reported artifact missing");
        result.success = false;
        result.path = String::new();
        result.error = Some(format!("artifact missing at '{source}'"));
        return Ok(result);
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|io| CaptureError::Io {
            action: "create",
            path: parent.to_path_buf(),
            source: io,
        })?;
    }
    fs::copy(&source, &destination).map_err(|io| CaptureError::Io {
        action: "copy",
        path: destination.clone(),
        source: io,
    })?;
    debug!(target: RELOCATE_TARGET, from = %source, to = %destination, "artifact relocated");

    result.path = relative;
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        clippy::indexing_slicing,
        reason = "tests use expect and direct indexing for clarity"
    )]

    use camino::Utf8PathBuf;
    use panelshot_config::Theme;

    use super::*;

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");
        (temp, dir)
    }

    fn success(name: &str, theme: Theme, path: &str) -> CaptureResult {
        CaptureResult {
            name: name.to_owned(),
            theme,
            path: path.to_owned(),
            success: true,
            error: None,
        }
    }

    #[test]
    fn successful_results_are_copied_and_rewritten() {
        let (_project_temp, project) = temp_dir();
        let (_plugin_temp, plugin) = temp_dir();

        let artifact = project.join("screenshots/light/users-list.png");
        fs::create_dir_all(artifact.parent().expect("parent")).expect("create artifact dirs");
        fs::write(&artifact, b"png bytes").expect("write artifact");

        let results = relocate_results(
            vec![success(
                "users-list",
                Theme::Light,
                "screenshots/light/users-list.png",
            )],
            &project,
            &plugin,
            &OutputSection::default(),
        )
        .expect("relocation should succeed");

        assert_eq!(results[0].path, "screenshots/light/users-list.png");
        let copied = plugin.join("screenshots/light/users-list.png");
        assert!(copied.is_file());
        assert_eq!(fs::read(&copied).expect("read copy"), b"png bytes");
    }

    #[test]
    fn configured_directory_shapes_the_destination() {
        let (_project_temp, project) = temp_dir();
        let (_plugin_temp, plugin) = temp_dir();

        let artifact = project.join("screenshots/dark/home.png");
        fs::create_dir_all(artifact.parent().expect("parent")).expect("create artifact dirs");
        fs::write(&artifact, b"x").expect("write artifact");

        let output: OutputSection = serde_json::from_value(serde_json::json!({
            "directory": "docs/images",
        }))
        .expect("output section should deserialize");

        let results = relocate_results(
            vec![success("home", Theme::Dark, "screenshots/dark/home.png")],
            &project,
            &plugin,
            &output,
        )
        .expect("relocation should succeed");

        assert_eq!(results[0].path, "docs/images/dark/home.png");
        assert!(plugin.join("docs/images/dark/home.png").is_file());
    }

    #[test]
    fn failed_results_pass_through_unchanged() {
        let (_project_temp, project) = temp_dir();
        let (_plugin_temp, plugin) = temp_dir();

        let failed = CaptureResult {
            name: "broken".to_owned(),
            theme: Theme::Light,
            path: String::new(),
            success: false,
            error: Some("timeout".to_owned()),
        };
        let results = relocate_results(
            vec![failed.clone()],
            &project,
            &plugin,
            &OutputSection::default(),
        )
        .expect("relocation should succeed");
        assert_eq!(results[0], failed);
    }

    #[test]
    fn missing_artifacts_degrade_to_failures() {
        let (_project_temp, project) = temp_dir();
        let (_plugin_temp, plugin) = temp_dir();

        let results = relocate_results(
            vec![success("gone", Theme::Light, "screenshots/light/gone.png")],
            &project,
            &plugin,
            &OutputSection::default(),
        )
        .expect("relocation should succeed");

        assert!(!results[0].success);
        assert!(results[0].error.as_deref().is_some_and(|error| {
            error.contains("artifact missing")
        }));
    }
}

//! README section rewriting from capture results.
//!
//! The managed section is the text strictly between two occurrences of the
//! configured marker. Rewriting is a no-op when updating is disabled, the
//! README is missing, the marker does not appear twice, or no successful
//! results exist.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use panelshot_capture::CaptureResult;
use panelshot_config::{ReadmeSection, ReadmeTemplate, Theme};
use thiserror::Error;
use tracing::{debug, info};

/// Log target for README operations.
const README_TARGET: &str = "panelshot_readme";

/// README file name looked up in the plugin directory.
pub const README_FILE: &str = "README.md";

/// Errors raised while rewriting the README.
#[derive(Debug, Error)]
pub enum ReadmeError {
    /// The README exists but could not be read or written.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one update attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeOutcome {
    /// The managed section was rewritten.
    Updated,
    /// README updating is disabled in the manifest.
    SkippedDisabled,
    /// The plugin has no README file.
    SkippedMissingReadme,
    /// The marker does not appear twice in the README.
    SkippedNoMarker,
    /// No successful capture results exist to render.
    SkippedNoResults,
}

/// Rewrites the plugin README's managed section from `results`.
pub fn update_readme(
    plugin_dir: &Utf8Path,
    settings: &ReadmeSection,
    results: &[CaptureResult],
) -> Result<ReadmeOutcome, ReadmeError> {
    if !settings.update {
        debug!(target: README_TARGET, "README updating disabled");
        return Ok(ReadmeOutcome::SkippedDisabled);
    }
    let successful: Vec<&CaptureResult> = results.iter().filter(|result| result.success).collect();
    if successful.is_empty() {
        debug!(target: README_TARGET, "no successful results; README untouched");
        return Ok(ReadmeOutcome::SkippedNoResults);
    }

    let path = plugin_dir.join(README_FILE);
    if !path.is_file() {
        debug!(target: README_TARGET, %path, "no README to update");
        return Ok(ReadmeOutcome::SkippedMissingReadme);
    }
    let text = fs::read_to_string(&path).map_err(|source| ReadmeError::Io {
        action: "read",
        path: path.clone(),
        source,
    })?;

    let block = match settings.template {
        ReadmeTemplate::Table => render_table(&successful),
        ReadmeTemplate::Gallery => render_gallery(&successful),
    };
    let Some(updated) = replace_section(&text, &settings.section_marker, &block) else {
        debug!(target: README_TARGET, marker = %settings.section_marker, "marker not found twice");
        return Ok(ReadmeOutcome::SkippedNoMarker);
    };

    fs::write(&path, updated).map_err(|source| ReadmeError::Io {
        action: "write",
        path: path.clone(),
        source,
    })?;
    info!(target: README_TARGET, %path, results = successful.len(), "README section updated");
    Ok(ReadmeOutcome::Updated)
}

/// Replaces the text strictly between the first two occurrences of
/// `marker`, or returns `None` when the marker does not appear twice.
#[must_use]
pub fn replace_section(text: &str, marker: &str, replacement: &str) -> Option<String> {
    let first = text.find(marker)?;
    let open_end = first + marker.len();
    let second_offset = text.get(open_end..)?.find(marker)?;
    let second = open_end + second_offset;

    let mut updated = String::with_capacity(text.len() + replacement.len());
    updated.push_str(text.get(..open_end)?);
    updated.push('\n');
    updated.push_str(replacement);
    updated.push('\n');
    updated.push_str(text.get(second..)?);
    Some(updated)
}

/// One row per screenshot, one column per theme.
fn render_table(results: &[&CaptureResult]) -> String {
    let mut themes: Vec<Theme> = Vec::new();
    for result in results {
        if !themes.contains(&result.theme) {
            themes.push(result.theme);
        }
    }
    let mut names: Vec<&str> = Vec::new();
    for result in results {
        if !names.contains(&result.name.as_str()) {
            names.push(&result.name);
        }
    }

    let mut block = String::from("| Screenshot |");
    for theme in &themes {
        block.push_str(&format!(" {} |", humanize(&theme.to_string())));
    }
    block.push_str("\n|---|");
    for _ in &themes {
        block.push_str("---|");
    }
    block.push('\n');
    for name in names {
        block.push_str(&format!("| {} |", humanize(name)));
        for theme in &themes {
            let cell = results
                .iter()
                .find(|result| result.name == name && result.theme == *theme)
                .map_or_else(String::new, |result| {
                    format!("![{}]({})", humanize(name), result.path)
                });
            block.push_str(&format!(" {cell} |"));
        }
        block.push('\n');
    }
    block
}

/// A heading and image per (screenshot, theme) pair.
fn render_gallery(results: &[&CaptureResult]) -> String {
    let mut block = String::new();
    for result in results {
        block.push_str(&format!(
            "### {} ({})\n\n![{}]({})\n\n",
            humanize(&result.name),
            result.theme,
            humanize(&result.name),
            result.path
        ));
    }
    block.trim_end().to_owned()
}

/// Dashes and underscores to spaces, first letter upper-cased.
#[must_use]
pub fn humanize(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "tests use expect for fixture setup clarity"
    )]

    use rstest::rstest;

    use super::*;

    fn result(name: &str, theme: Theme, path: &str, success: bool) -> CaptureResult {
        CaptureResult {
            name: name.to_owned(),
            theme,
            path: path.to_owned(),
            success,
            error: (!success).then(|| "boom".to_owned()),
        }
    }

    fn settings(update: bool) -> ReadmeSection {
        ReadmeSection {
            update,
            ..ReadmeSection::default()
        }
    }

    fn plugin_with_readme(text: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");
        fs::write(dir.join(README_FILE), text).expect("write README");
        (temp, dir)
    }

    const README: &str = "# Plugin\n\n<!-- SCREENSHOTS -->\nold content\n<!-- SCREENSHOTS -->\n\nTrailer.\n";

    #[test]
    fn the_section_between_markers_is_replaced() {
        let (_temp, dir) = plugin_with_readme(README);
        let results = [result(
            "users-list",
            Theme::Light,
            "screenshots/light/users-list.png",
            true,
        )];

        let outcome =
            update_readme(&dir, &settings(true), &results).expect("update should succeed");
        assert_eq!(outcome, ReadmeOutcome::Updated);

        let text = fs::read_to_string(dir.join(README_FILE)).expect("read README");
        assert!(!text.contains("old content"));
        assert!(text.contains("| Users list |"));
        assert!(text.contains("screenshots/light/users-list.png"));
        assert!(text.starts_with("# Plugin\n"));
        assert!(text.ends_with("Trailer.\n"));
    }

    #[test]
    fn disabled_updating_is_a_no_op() {
        let (_temp, dir) = plugin_with_readme(README);
        let results = [result("a", Theme::Light, "p.png", true)];
        let outcome =
            update_readme(&dir, &settings(false), &results).expect("update should succeed");
        assert_eq!(outcome, ReadmeOutcome::SkippedDisabled);
        let text = fs::read_to_string(dir.join(README_FILE)).expect("read README");
        assert_eq!(text, README);
    }

    #[test]
    fn a_single_marker_is_not_enough() {
        let (_temp, dir) = plugin_with_readme("# Plugin\n\n<!-- SCREENSHOTS -->\n");
        let results = [result("a", Theme::Light, "p.png", true)];
        let outcome =
            update_readme(&dir, &settings(true), &results).expect("update should succeed");
        assert_eq!(outcome, ReadmeOutcome::SkippedNoMarker);
    }

    #[test]
    fn failures_only_leave_the_readme_alone() {
        let (_temp, dir) = plugin_with_readme(README);
        let results = [result("a", Theme::Light, "", false)];
        let outcome =
            update_readme(&dir, &settings(true), &results).expect("update should succeed");
        assert_eq!(outcome, ReadmeOutcome::SkippedNoResults);
    }

    #[test]
    fn a_missing_readme_is_reported_not_created() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");
        let results = [result("a", Theme::Light, "p.png", true)];
        let outcome =
            update_readme(&dir, &settings(true), &results).expect("update should succeed");
        assert_eq!(outcome, ReadmeOutcome::SkippedMissingReadme);
        assert!(!dir.join(README_FILE).exists());
    }

    #[test]
    fn tables_pair_names_with_themes() {
        let results = [
            result("users-list", Theme::Light, "shots/light/users-list.png", true),
            result("users-list", Theme::Dark, "shots/dark/users-list.png", true),
        ];
        let refs: Vec<&CaptureResult> = results.iter().collect();
        let table = render_table(&refs);
        assert!(table.contains("| Screenshot | Light | Dark |"));
        assert!(table.contains("![Users list](shots/light/users-list.png)"));
        assert!(table.contains("![Users list](shots/dark/users-list.png)"));
    }

    #[test]
    fn galleries_render_one_heading_per_pair() {
        let results = [
            result("home", Theme::Light, "shots/light/home.png", true),
            result("home", Theme::Dark, "shots/dark/home.png", true),
        ];
        let refs: Vec<&CaptureResult> = results.iter().collect();
        let gallery = render_gallery(&refs);
        assert!(gallery.contains("### Home (light)"));
        assert!(gallery.contains("### Home (dark)"));
        assert!(gallery.contains("![Home](shots/dark/home.png)"));
    }

    #[rstest]
    #[case("users-list", "Users list")]
    #[case("my_shot", "My shot")]
    #[case("home", "Home")]
    #[case("", "")]
    fn names_humanize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(humanize(raw), expected);
    }
}

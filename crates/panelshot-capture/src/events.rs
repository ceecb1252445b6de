//! Parsing the worker's newline-delimited JSON event stream.

use std::str::FromStr;

use panelshot_config::Theme;
use serde_json::Value;
use tracing::debug;

/// Log target for event parsing.
const EVENTS_TARGET: &str = "panelshot_capture::events";

/// One outcome per (screenshot, theme) pair. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Screenshot name from the manifest.
    pub name: String,
    /// Theme the shot was taken under.
    pub theme: Theme,
    /// Artifact path; worker-relative until relocation, plugin-relative
    /// after, empty for failures.
    pub path: String,
    /// Whether the worker reported success.
    pub success: bool,
    /// Worker error message for failures.
    pub error: Option<String>,
}

/// Parses worker stdout into results.
///
/// Two event shapes are recognized: `progress`/`done` and
/// `progress`/`error`. Lines that are not JSON objects or carry any other
/// shape (the terminal `complete` event, future additions) are silently
/// ignored.
#[must_use]
pub fn parse_events(stdout: &str) -> Vec<CaptureResult> {
    stdout.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<CaptureResult> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(event) = serde_json::from_str::<Value>(trimmed) else {
        debug!(target: EVENTS_TARGET, line = trimmed, "non-JSON worker output ignored");
        return None;
    };
    if event.get("type").and_then(Value::as_str) != Some("progress") {
        return None;
    }

    let name = event.get("name").and_then(Value::as_str)?.to_owned();
    let theme = Theme::from_str(event.get("theme").and_then(Value::as_str)?).ok()?;

    match event.get("status").and_then(Value::as_str) {
        Some("done") => Some(CaptureResult {
            name,
            theme,
            path: event
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            success: true,
            error: None,
        }),
        Some("error") => Some(CaptureResult {
            name,
            theme,
            path: String::new(),
            success: false,
            error: event
                .get("error")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::indexing_slicing,
        reason = "tests index into known-size result vectors"
    )]

    use super::*;

    #[test]
    fn done_and_error_events_become_results() {
        let stdout = concat!(
            r#"{"type":"progress","status":"done","name":"users-list","theme":"light","path":"screenshots/light/users-list.png"}"#,
            "\n",
            r#"{"type":"progress","status":"error","name":"users-list","theme":"dark","error":"selector not found"}"#,
            "\n",
            r#"{"type":"complete"}"#,
            "\n",
        );
        let results = parse_events(stdout);
        assert_eq!(results.len(), 2);

        assert!(results[0].success);
        assert_eq!(results[0].theme, Theme::Light);
        assert_eq!(results[0].path, "screenshots/light/users-list.png");

        assert!(!results[1].success);
        assert_eq!(results[1].theme, Theme::Dark);
        assert_eq!(results[1].error.as_deref(), Some("selector not found"));
        assert!(results[1].path.is_empty());
    }

    #[test]
    fn unrecognized_lines_are_silently_ignored() {
        let stdout = concat!(
            "Debugger attached.\n",
            "{not json}\n",
            r#"{"type":"telemetry","status":"done","name":"x","theme":"light"}"#,
            "\n",
            r#"{"type":"progress","status":"skipped","name":"x","theme":"light"}"#,
            "\n",
            r#"{"type":"progress","status":"done","name":"ok","theme":"light","path":"p.png"}"#,
            "\n",
        );
        let results = parse_events(stdout);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "ok");
    }

    #[test]
    fn events_with_unknown_themes_are_ignored() {
        let stdout =
            r#"{"type":"progress","status":"done","name":"x","theme":"sepia","path":"p.png"}"#;
        assert!(parse_events(stdout).is_empty());
    }

    #[test]
    fn empty_output_yields_no_results() {
        assert!(parse_events("").is_empty());
        assert!(parse_events("\n\n").is_empty());
    }
}

//! Manifest provider behaviour: collected validation, load/save round trips.

use std::fs;

use camino::Utf8Path;
use panelshot_config::{Manifest, ManifestError, Theme, validate_document};
use tempfile::TempDir;

fn plugin_dir(temp: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(temp.path()).expect("temp dir should be utf-8")
}

#[test]
fn missing_manifest_reports_not_found() {
    let temp = TempDir::new().expect("create temp dir");
    let error = Manifest::load(plugin_dir(&temp)).expect_err("load must fail");
    assert!(matches!(error, ManifestError::NotFound { .. }));
}

#[test]
fn validation_collects_every_violation_together() {
    let document = serde_json::json!({
        "plugin": {"package": "acme/blog"},
        "screenshots": [
            {"name": "dashboard"},
        ],
        "output": {
            "themes": ["light", "sepia"],
            "format": "bmp",
        },
    });

    let violations = validate_document(&document);

    assert_eq!(violations.len(), 4, "violations: {violations:?}");
    assert!(violations.contains(&"Missing required field: plugin.name".to_owned()));
    assert!(violations.contains(&"Missing required field: screenshots[0].url".to_owned()));
    assert!(violations.contains(&"Invalid theme: sepia. Must be one of: light, dark".to_owned()));
    assert!(
        violations.contains(&"Invalid format: bmp. Must be one of: png, jpg, webp".to_owned())
    );
}

#[test]
fn screenshots_must_be_an_array() {
    let document = serde_json::json!({
        "plugin": {"name": "Blog", "package": "acme/blog"},
        "screenshots": {"name": "dashboard", "url": "/admin"},
    });
    let violations = validate_document(&document);
    assert_eq!(violations, ["Field \"screenshots\" must be an array"]);
}

#[test]
fn missing_plugin_section_is_a_single_violation() {
    let violations = validate_document(&serde_json::json!({}));
    assert_eq!(violations, ["Missing required field: plugin"]);
}

#[test]
fn invalid_manifest_load_carries_violations() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(
        temp.path().join("panelshot.json"),
        r#"{"plugin": {"name": "Blog"}}"#,
    )
    .expect("write manifest");

    let error = Manifest::load(plugin_dir(&temp)).expect_err("load must fail");
    match error {
        ManifestError::Invalid { violations, .. } => {
            assert_eq!(violations, ["Missing required field: plugin.package"]);
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn save_then_load_round_trips() {
    let temp = TempDir::new().expect("create temp dir");
    let dir = plugin_dir(&temp);

    let manifest: Manifest = serde_json::from_value(serde_json::json!({
        "plugin": {"name": "Blog", "package": "acme/blog"},
        "screenshots": [
            {"name": "dashboard", "url": "/admin"},
        ],
        "output": {"themes": ["dark"]},
    }))
    .expect("manifest should deserialize");

    assert!(!Manifest::exists(dir));
    manifest.save(dir).expect("save should succeed");
    assert!(Manifest::exists(dir));

    let written = fs::read_to_string(temp.path().join("panelshot.json")).expect("read back");
    assert!(written.ends_with('\n'), "pretty JSON ends with newline");

    let loaded = Manifest::load(dir).expect("load should succeed");
    assert_eq!(loaded, manifest);
    assert_eq!(loaded.output.themes, [Theme::Dark]);
}

//! Installing the plugin into the project as a local path dependency.

use std::fs;

use camino::Utf8Path;
use panelshot_config::Manifest;
use panelshot_exec::{Toolchain, run_ok};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::ProjectError;

/// Log target for composer operations.
const COMPOSER_TARGET: &str = "panelshot_project::composer";

/// Adds a symlinked `path` repository for `plugin_dir` to the project's
/// composer.json. Re-running with the repository already present is a
/// no-op.
pub fn add_path_repository(
    project_dir: &Utf8Path,
    plugin_dir: &Utf8Path,
) -> Result<(), ProjectError> {
    let path = project_dir.join("composer.json");
    let text = fs::read_to_string(&path).map_err(|source| ProjectError::Io {
        action: "read",
        path: path.clone(),
        source,
    })?;
    let mut document: Value =
        serde_json::from_str(&text).map_err(|source| ProjectError::ComposerManifest {
            path: path.clone(),
            source,
        })?;

    let repositories = document
        .as_object_mut()
        .map(|root| root.entry("repositories").or_insert_with(|| json!([])));
    let Some(Value::Array(entries)) = repositories else {
        return Err(ProjectError::ComposerManifest {
            path,
            source: serde_json::Error::io(std::io::Error::other(
                "composer.json root is not an object or repositories is not an array",
            )),
        });
    };

    let already_present = entries
        .iter()
        .any(|entry| entry.get("url").and_then(Value::as_str) == Some(plugin_dir.as_str()));
    if already_present {
        debug!(target: COMPOSER_TARGET, plugin = %plugin_dir, "path repository already present");
        return Ok(());
    }

    entries.push(json!({
        "type": "path",
        "url": plugin_dir.as_str(),
        "options": {"symlink": true},
    }));

    let mut rendered =
        serde_json::to_string_pretty(&document).map_err(|source| ProjectError::ComposerManifest {
            path: path.clone(),
            source,
        })?;
    rendered.push('\n');
    fs::write(&path, rendered).map_err(|source| ProjectError::Io {
        action: "write",
        path,
        source,
    })?;
    debug!(target: COMPOSER_TARGET, plugin = %plugin_dir, "path repository added");
    Ok(())
}

/// Requires the plugin package at `@dev` plus any configured extras.
pub fn install_plugin(
    manifest: &Manifest,
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
    plugin_dir: &Utf8Path,
) -> Result<(), ProjectError> {
    add_path_repository(project_dir, plugin_dir)?;

    let package = &manifest.plugin.package;
    info!(target: COMPOSER_TARGET, package, "requiring plugin package");
    run_ok(
        &toolchain
            .composer(["require", package.as_str(), "@dev"])
            .current_dir(project_dir),
    )?;

    for extra in &manifest.install.extra_packages {
        info!(target: COMPOSER_TARGET, package = extra, "requiring extra package");
        run_ok(
            &toolchain
                .composer(["require", extra.as_str()])
                .current_dir(project_dir),
        )?;
    }
    Ok(())
}

//! Creating and destroying the ephemeral project directory.

use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use panelshot_config::Config;
use panelshot_exec::{CommandLine, Toolchain, run, run_ok};
use tracing::{debug, info, warn};

use crate::error::ProjectError;

/// Log target for scaffold operations.
const SCAFFOLD_TARGET: &str = "panelshot_project::scaffold";

/// `composer create-project` downloads a full framework skeleton.
const SCAFFOLD_TIMEOUT: Duration = Duration::from_secs(600);

/// Scaffolds a fresh project from `kit` at the configured temp location.
///
/// Any stale directory from a previous run is removed first, best-effort.
pub fn create(
    config: &Config,
    toolchain: &Toolchain,
    kit: &str,
) -> Result<Utf8PathBuf, ProjectError> {
    let project_dir = config.temp_dir.clone();
    remove_stale(&project_dir);

    info!(target: SCAFFOLD_TARGET, kit, dir = %project_dir, "scaffolding project");
    let command = toolchain
        .composer([
            "create-project",
            kit,
            project_dir.as_str(),
            "--no-interaction",
            "--prefer-dist",
        ])
        .timeout(SCAFFOLD_TIMEOUT);
    run_ok(&command)?;
    Ok(project_dir)
}

/// Best-effort removal of a leftover directory, with a shell fallback for
/// trees `remove_dir_all` cannot take down (dangling symlinks, odd modes).
fn remove_stale(dir: &Utf8Path) {
    if !dir.exists() {
        return;
    }
    debug!(target: SCAFFOLD_TARGET, %dir, "removing stale project directory");
    if fs::remove_dir_all(dir).is_ok() {
        return;
    }
    let fallback = CommandLine::new("rm").args(["-rf", dir.as_str()]);
    if run(&fallback).is_err() || dir.exists() {
        warn!(target: SCAFFOLD_TARGET, %dir, "stale directory could not be fully removed");
    }
}

/// Removes the project directory. Never fails; a missing directory is a
/// no-op and removal errors are logged at debug only.
pub fn cleanup(project_dir: &Utf8Path) {
    if !project_dir.exists() {
        return;
    }
    match fs::remove_dir_all(project_dir) {
        Ok(()) => info!(target: SCAFFOLD_TARGET, dir = %project_dir, "project directory removed"),
        Err(source) => {
            debug!(
                target: SCAFFOLD_TARGET,
                dir = %project_dir,
                error = %source,
                "cleanup failed; leaving directory behind"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");
        (temp, dir)
    }

    #[test]
    fn cleanup_removes_populated_directories() {
        let (_temp, base) = temp_dir();
        let project = base.join("project");
        fs::create_dir_all(project.join("app")).expect("create nested dirs");
        fs::write(project.join("app/file.php"), "<?php\n").expect("write file");

        cleanup(&project);
        assert!(!project.exists());
    }

    #[test]
    fn cleanup_is_a_no_op_for_missing_directories() {
        let (_temp, base) = temp_dir();
        cleanup(&base.join("never-created"));
    }

    #[test]
    fn stale_directories_are_removed_before_scaffolding() {
        let (_temp, base) = temp_dir();
        let stale = base.join("stale");
        fs::create_dir_all(&stale).expect("create stale dir");
        fs::write(stale.join("leftover.txt"), "old run").expect("write leftover");

        remove_stale(&stale);
        assert!(!stale.exists());
    }
}

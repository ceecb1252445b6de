//! Publish, post-install, and asset-build steps.
//!
//! Each step runs an ordered command list and fails fast: the first
//! non-zero exit aborts the pipeline with the command, code, and output
//! carried in the error.

use camino::Utf8Path;
use panelshot_config::Manifest;
use panelshot_exec::{Toolchain, run_ok};
use tracing::{debug, info};

use crate::error::ProjectError;

/// Log target for command steps.
const COMMANDS_TARGET: &str = "panelshot_project::commands";

/// Runs `vendor:publish` for every configured tag.
pub fn publish_assets(
    manifest: &Manifest,
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
) -> Result<(), ProjectError> {
    for tag in &manifest.install.publish {
        info!(target: COMMANDS_TARGET, tag, "publishing assets");
        run_ok(&toolchain.artisan(project_dir, ["vendor:publish", &format!("--tag={tag}")]))?;
    }
    Ok(())
}

/// Runs the configured post-install artisan commands in order.
pub fn run_post_install(
    manifest: &Manifest,
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
) -> Result<(), ProjectError> {
    for command in &manifest.install.post_install_commands {
        info!(target: COMMANDS_TARGET, command, "running post-install command");
        let tokens: Vec<&str> = command.split_whitespace().collect();
        run_ok(&toolchain.artisan(project_dir, tokens))?;
    }
    Ok(())
}

/// Installs and builds frontend dependencies, skipped for projects without
/// a `package.json`.
pub fn build_assets(toolchain: &Toolchain, project_dir: &Utf8Path) -> Result<(), ProjectError> {
    if !project_dir.join("package.json").is_file() {
        debug!(target: COMMANDS_TARGET, "no package.json; skipping asset build");
        return Ok(());
    }
    info!(target: COMMANDS_TARGET, "building frontend assets");
    run_ok(&toolchain.pnpm(["install"]).current_dir(project_dir))?;
    run_ok(&toolchain.pnpm(["build"]).current_dir(project_dir))?;
    Ok(())
}

//! Installing and invoking the external capture worker.

use std::fs;
use std::time::Duration;

use camino::Utf8Path;
use panelshot_config::{Config, Manifest};
use panelshot_exec::{Toolchain, run, run_ok};
use tracing::{debug, info};
use url::Url;

use crate::error::CaptureError;
use crate::events::{CaptureResult, parse_events};
use crate::job::build_job;
use crate::relocate::relocate_results;

/// Log target for worker operations.
const WORKER_TARGET: &str = "panelshot_capture::worker";

/// The embedded worker script, written into the project verbatim.
const WORKER_SCRIPT: &str = include_str!("../assets/worker.cjs");

/// File names the worker inputs are written under inside the project.
const SCRIPT_FILE: &str = "panelshot-worker.cjs";
const JOB_FILE: &str = "panelshot-job.json";

/// Default manifest written when the project has none; puppeteer drives the
/// browser and sharp handles crops and format conversion.
const DEFAULT_PACKAGE_JSON: &str = r#"{
    "private": true,
    "dependencies": {
        "puppeteer": "^24.0.0",
        "sharp": "^0.33.0"
    }
}
"#;

/// Worker invocations cover every (screenshot, theme) pair in one process.
const WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs the full capture stage and returns one result per
/// (screenshot, theme) pair, with artifacts relocated into the plugin.
///
/// Individual screenshot failures are not fatal: they surface as failed
/// results. Only worker-level failures (non-zero exit, missing
/// dependencies) abort with an error.
pub fn capture(
    manifest: &Manifest,
    config: &Config,
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
    plugin_dir: &Utf8Path,
    base_url: &Url,
) -> Result<Vec<CaptureResult>, CaptureError> {
    ensure_dependencies(toolchain, project_dir)?;

    let job = build_job(manifest, config, project_dir, base_url)?;
    let job_text =
        serde_json::to_string_pretty(&job).map_err(|source| CaptureError::Job { source })?;

    let script_path = project_dir.join(SCRIPT_FILE);
    let job_path = project_dir.join(JOB_FILE);
    write_file(&script_path, WORKER_SCRIPT)?;
    write_file(&job_path, &job_text)?;

    info!(
        target: WORKER_TARGET,
        screenshots = job.screenshots.len(),
        themes = job.themes.len(),
        "invoking capture worker"
    );
    let command = toolchain
        .node([script_path.as_str(), job_path.as_str()])
        .current_dir(project_dir)
        .timeout(WORKER_TIMEOUT);
    let output = run(&command)?;
    if !output.success() {
        return Err(CaptureError::Worker {
            code: output.code,
            stderr: output.stderr,
        });
    }

    let results = parse_events(&output.stdout);
    debug!(target: WORKER_TARGET, results = results.len(), "worker events parsed");
    relocate_results(results, project_dir, plugin_dir, &manifest.output)
}

/// Makes sure the worker's Node dependencies are present in the project,
/// writing the default manifest when none exists.
pub fn ensure_dependencies(
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
) -> Result<(), CaptureError> {
    let package_json = project_dir.join("package.json");
    if !package_json.is_file() {
        debug!(target: WORKER_TARGET, "writing default package.json for the worker");
        write_file(&package_json, DEFAULT_PACKAGE_JSON)?;
    }
    run_ok(&toolchain.pnpm(["install"]).current_dir(project_dir))?;
    Ok(())
}

fn write_file(path: &Utf8Path, text: &str) -> Result<(), CaptureError> {
    fs::write(path, text).map_err(|source| CaptureError::Io {
        action: "write",
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::indexing_slicing,
        reason = "tests use JSON indexing for clarity"
    )]

    use super::*;

    #[test]
    fn the_embedded_script_speaks_the_event_protocol() {
        // The script is a black box, but the contract strings it emits are
        // load-bearing for the parser.
        assert!(WORKER_SCRIPT.contains("\"progress\""));
        assert!(WORKER_SCRIPT.contains("\"complete\""));
        assert!(WORKER_SCRIPT.contains("puppeteer"));
    }

    #[test]
    fn the_default_package_manifest_is_valid_json() {
        let document: serde_json::Value =
            serde_json::from_str(DEFAULT_PACKAGE_JSON).unwrap_or_default();
        assert!(document["dependencies"]["puppeteer"].is_string());
        assert!(document["dependencies"]["sharp"].is_string());
    }
}

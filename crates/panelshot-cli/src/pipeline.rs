//! Command dispatch and pipeline orchestration.
//!
//! Step progress is one line per step on stdout; structured logs go to
//! stderr. Teardown (server stop, project removal) always runs after the
//! full pipeline and never masks the error that aborted it.

use std::process::ExitCode;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use panelshot_analyze::analyze;
use panelshot_capture::{CaptureResult, capture};
use panelshot_config::{Config, Manifest, ManifestError, Theme};
use panelshot_exec::Toolchain;
use panelshot_readme::{ReadmeOutcome, update_readme};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::errors::AppError;

const PIPELINE_TARGET: &str = "panelshot_cli::pipeline";

/// Flags controlling the `run` command.
struct RunOptions {
    keep: bool,
    skip_seed: bool,
    skip_capture: bool,
    skip_readme: bool,
}

pub(crate) fn dispatch(cli: &Cli, config: &Config) -> Result<ExitCode, AppError> {
    let plugin_dir = cli.path.as_path();
    match &cli.command {
        Command::Run {
            keep,
            skip_seed,
            skip_capture,
            skip_readme,
        } => run_pipeline(
            plugin_dir,
            config,
            &RunOptions {
                keep: *keep,
                skip_seed: *skip_seed,
                skip_capture: *skip_capture,
                skip_readme: *skip_readme,
            },
        ),
        Command::Setup { keep } => setup(plugin_dir, config, *keep),
        Command::Seed { project } => seed(plugin_dir, config, project.as_deref()),
        Command::Capture { project, theme } => {
            run_capture(plugin_dir, config, project.as_deref(), theme.as_deref())
        }
        Command::Readme => readme(plugin_dir),
        Command::Cleanup { project } => Ok(cleanup(config, project.as_deref())),
        Command::Validate => validate(plugin_dir),
    }
}

fn run_pipeline(
    plugin_dir: &Utf8Path,
    config: &Config,
    options: &RunOptions,
) -> Result<ExitCode, AppError> {
    let manifest = Manifest::load(plugin_dir)?;
    let toolchain = Toolchain::new(config);

    step("creating project");
    let project_dir = panelshot_project::create(config, &toolchain, &manifest.kit.package)?;

    let result = run_stages(
        &manifest,
        config,
        &toolchain,
        plugin_dir,
        &project_dir,
        options,
    );

    if options.keep {
        println!("project kept at {project_dir}");
    } else {
        step("cleaning up");
        panelshot_project::cleanup(&project_dir);
    }
    result
}

fn run_stages(
    manifest: &Manifest,
    config: &Config,
    toolchain: &Toolchain,
    plugin_dir: &Utf8Path,
    project_dir: &Utf8Path,
    options: &RunOptions,
) -> Result<ExitCode, AppError> {
    prepare_project(manifest, toolchain, plugin_dir, project_dir)?;

    if options.skip_seed {
        debug!(target: PIPELINE_TARGET, "seed stage skipped");
    } else {
        seed_project(manifest, toolchain, plugin_dir, project_dir)?;
    }

    if options.skip_capture {
        debug!(target: PIPELINE_TARGET, "capture stage skipped");
        return Ok(ExitCode::SUCCESS);
    }

    step("starting server");
    let mut hosting = panelshot_project::ensure_server(config, toolchain, project_dir)?;
    step("capturing screenshots");
    let captured = capture(
        manifest,
        config,
        toolchain,
        project_dir,
        plugin_dir,
        hosting.base_url(),
    );
    step("stopping server");
    hosting.release();
    let results = captured?;
    print_capture_summary(&results);
    let any_failed = results.iter().any(|result| !result.success);

    if options.skip_readme {
        debug!(target: PIPELINE_TARGET, "README stage skipped");
    } else {
        step("updating README");
        let outcome = update_readme(plugin_dir, &manifest.readme, &results)?;
        print_readme_outcome(outcome);
    }

    Ok(if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Install through asset build; shared by `run` and `setup`.
fn prepare_project(
    manifest: &Manifest,
    toolchain: &Toolchain,
    plugin_dir: &Utf8Path,
    project_dir: &Utf8Path,
) -> Result<(), AppError> {
    step("installing plugin");
    panelshot_project::install_plugin(manifest, toolchain, project_dir, plugin_dir)?;
    step("registering plugin with panels");
    panelshot_project::register_plugins(manifest, project_dir)?;
    step("publishing assets");
    panelshot_project::publish_assets(manifest, toolchain, project_dir)?;
    step("running post-install commands");
    panelshot_project::run_post_install(manifest, toolchain, project_dir)?;
    step("building assets");
    panelshot_project::build_assets(toolchain, project_dir)?;
    Ok(())
}

fn seed_project(
    manifest: &Manifest,
    toolchain: &Toolchain,
    plugin_dir: &Utf8Path,
    project_dir: &Utf8Path,
) -> Result<(), AppError> {
    step("analysing plugin");
    let analysis = analyze(plugin_dir)?;
    step("seeding data");
    let plan = panelshot_seed::plan(&analysis, &manifest.seed);
    panelshot_seed::write_plan(&plan, project_dir)?;
    panelshot_seed::run_seeders(toolchain, project_dir)?;
    Ok(())
}

fn setup(plugin_dir: &Utf8Path, config: &Config, keep: bool) -> Result<ExitCode, AppError> {
    let manifest = Manifest::load(plugin_dir)?;
    let toolchain = Toolchain::new(config);

    step("creating project");
    let project_dir = panelshot_project::create(config, &toolchain, &manifest.kit.package)?;
    match prepare_project(&manifest, &toolchain, plugin_dir, &project_dir) {
        Ok(()) => {
            println!("project ready at {project_dir}");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if keep {
                println!("project kept at {project_dir}");
            } else {
                panelshot_project::cleanup(&project_dir);
            }
            Err(error)
        }
    }
}

fn seed(
    plugin_dir: &Utf8Path,
    config: &Config,
    project: Option<&Utf8Path>,
) -> Result<ExitCode, AppError> {
    let manifest = Manifest::load(plugin_dir)?;
    let project_dir = existing_project(config, project)?;
    let toolchain = Toolchain::new(config);
    seed_project(&manifest, &toolchain, plugin_dir, &project_dir)?;
    println!("seeders ran against {project_dir}");
    Ok(ExitCode::SUCCESS)
}

fn run_capture(
    plugin_dir: &Utf8Path,
    config: &Config,
    project: Option<&Utf8Path>,
    theme: Option<&str>,
) -> Result<ExitCode, AppError> {
    let mut manifest = Manifest::load(plugin_dir)?;
    if let Some(requested) = theme {
        manifest.output.themes = vec![select_theme(&manifest, requested)?];
    }
    let project_dir = existing_project(config, project)?;
    let toolchain = Toolchain::new(config);

    step("starting server");
    let mut hosting = panelshot_project::ensure_server(config, &toolchain, &project_dir)?;
    step("capturing screenshots");
    let captured = capture(
        &manifest,
        config,
        &toolchain,
        &project_dir,
        plugin_dir,
        hosting.base_url(),
    );
    step("stopping server");
    hosting.release();
    let results = captured?;
    print_capture_summary(&results);

    Ok(if results.iter().any(|result| !result.success) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn select_theme(manifest: &Manifest, requested: &str) -> Result<Theme, AppError> {
    let available = || {
        manifest
            .output
            .themes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let theme = Theme::from_str(requested).map_err(|_| AppError::UnknownTheme {
        requested: requested.to_owned(),
        available: available(),
    })?;
    if manifest.output.themes.contains(&theme) {
        Ok(theme)
    } else {
        Err(AppError::UnknownTheme {
            requested: requested.to_owned(),
            available: available(),
        })
    }
}

fn readme(plugin_dir: &Utf8Path) -> Result<ExitCode, AppError> {
    let manifest = Manifest::load(plugin_dir)?;
    let results = results_from_artifacts(&manifest, plugin_dir);
    let outcome = update_readme(plugin_dir, &manifest.readme, &results)?;
    print_readme_outcome(outcome);
    Ok(ExitCode::SUCCESS)
}

/// Rebuilds capture results from artifacts already on disk, one per
/// configured (screenshot, theme) pair whose file exists.
fn results_from_artifacts(manifest: &Manifest, plugin_dir: &Utf8Path) -> Vec<CaptureResult> {
    let extension = manifest.output.format.extension();
    let mut results = Vec::new();
    for theme in &manifest.output.themes {
        for spec in &manifest.screenshots {
            let relative = format!(
                "{}/{theme}/{}.{extension}",
                manifest.output.directory, spec.name
            );
            if plugin_dir.join(&relative).is_file() {
                results.push(CaptureResult {
                    name: spec.name.clone(),
                    theme: *theme,
                    path: relative,
                    success: true,
                    error: None,
                });
            } else {
                debug!(target: PIPELINE_TARGET, %relative, "no artifact for this pair");
            }
        }
    }
    results
}

fn cleanup(config: &Config, project: Option<&Utf8Path>) -> ExitCode {
    let project_dir = project.map_or_else(|| config.temp_dir.clone(), Utf8Path::to_path_buf);
    if project_dir.exists() {
        panelshot_project::cleanup(&project_dir);
        println!("removed {project_dir}");
    } else {
        println!("nothing to clean up at {project_dir}");
    }
    ExitCode::SUCCESS
}

fn validate(plugin_dir: &Utf8Path) -> Result<ExitCode, AppError> {
    match Manifest::load(plugin_dir) {
        Ok(manifest) => {
            println!(
                "{} ({}) is valid: {} screenshot(s)",
                manifest.plugin.name,
                manifest.plugin.package,
                manifest.screenshots.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ManifestError::Invalid { path, violations }) => {
            println!("invalid manifest at {path}:");
            for violation in &violations {
                println!("  - {violation}");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(error) => Err(error.into()),
    }
}

fn existing_project(
    config: &Config,
    project: Option<&Utf8Path>,
) -> Result<Utf8PathBuf, AppError> {
    let project_dir = project.map_or_else(|| config.temp_dir.clone(), Utf8Path::to_path_buf);
    if project_dir.is_dir() {
        Ok(project_dir)
    } else {
        Err(AppError::ProjectMissing { path: project_dir })
    }
}

fn step(message: &str) {
    println!("==> {message}");
}

fn print_capture_summary(results: &[CaptureResult]) {
    for result in results {
        let detail = if result.success {
            result.path.clone()
        } else {
            result.error.clone().unwrap_or_else(|| "unknown error".to_owned())
        };
        let status = if result.success { "done" } else { "fail" };
        println!("{status}  {:<5}  {:<24}  {detail}", result.theme, result.name);
    }
    let succeeded = results.iter().filter(|result| result.success).count();
    println!("captured {succeeded} of {} screenshot(s)", results.len());
}

fn print_readme_outcome(outcome: ReadmeOutcome) {
    match outcome {
        ReadmeOutcome::Updated => println!("README section updated"),
        ReadmeOutcome::SkippedDisabled => {
            println!("README updating is disabled in the manifest");
        }
        ReadmeOutcome::SkippedMissingReadme => println!("no README.md found; nothing updated"),
        ReadmeOutcome::SkippedNoMarker => {
            println!("README has no marker pair; nothing updated");
        }
        ReadmeOutcome::SkippedNoResults => {
            println!("no capture artifacts found; README untouched");
        }
    }
}

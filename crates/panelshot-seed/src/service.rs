//! Writing a seed plan into the project and running it.

use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use panelshot_exec::{Toolchain, run_ok};
use tracing::{debug, info};

use crate::error::SeedError;
use crate::plan::SeedPlan;
use crate::render::MASTER_SEEDER_CLASS;

/// Log target for seed execution.
const SERVICE_TARGET: &str = "panelshot_seed::service";

/// Timeout for the master seeder run; migrations plus factories can be slow
/// on a cold project.
const SEED_TIMEOUT: Duration = Duration::from_secs(300);

/// Writes every unit of `plan` into `project_dir`, returning the written
/// paths.
///
/// Factories yield to files the project already provides; all other units
/// overwrite.
pub fn write_plan(plan: &SeedPlan, project_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, SeedError> {
    let mut written = Vec::new();
    for unit in &plan.units {
        let path = project_dir.join(unit.relative_path());
        if unit.keeps_existing() && path.is_file() {
            debug!(target: SERVICE_TARGET, %path, "project provides this factory; keeping it");
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SeedError::Write {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, unit.render()).map_err(|source| SeedError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    info!(
        target: SERVICE_TARGET,
        files = written.len(),
        "seed units written"
    );
    Ok(written)
}

/// Runs the master seeder once through artisan.
pub fn run_seeders(toolchain: &Toolchain, project_dir: &Utf8Path) -> Result<(), SeedError> {
    let command = toolchain
        .artisan(
            project_dir,
            ["db:seed", &format!("--class={MASTER_SEEDER_CLASS}")],
        )
        .timeout(SEED_TIMEOUT);
    run_ok(&command)?;
    info!(target: SERVICE_TARGET, "database seeded");
    Ok(())
}

//! Command-line runtime for the `panelshot` binary.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! installation, and dispatch into the pipeline commands. Configuration
//! flags are split off the argument list before clap parsing so the
//! `ortho_config` loader and the command surface stay independent.

use std::error::Error;
use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;
use panelshot_config::Config;

mod cli;
mod config;
mod errors;
mod pipeline;
mod telemetry;

use cli::Cli;
use config::{prepare_cli_arguments, split_config_arguments};
use errors::AppError;

/// Runs the CLI with the given process arguments.
#[must_use]
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, &split);

    let cli = match Cli::try_parse_from(cli_arguments) {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version requests surface as parse errors; clap
            // routes them to the right stream.
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let result = Config::load_from_iter(split.config_arguments.iter().cloned())
        .map_err(AppError::LoadConfiguration)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            pipeline::dispatch(&cli, &config)
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            report_error(&error, cli.verbose);
            ExitCode::FAILURE
        }
    }
}

/// One-line summary on stderr; the full source chain with `--verbose`.
fn report_error(error: &AppError, verbose: bool) {
    eprintln!("error: {error}");
    if !verbose {
        return;
    }
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

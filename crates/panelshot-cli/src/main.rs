//! Binary entrypoint for the `panelshot` CLI.
//!
//! The binary delegates to [`panelshot_cli::run`], which parses arguments,
//! loads configuration, initialises telemetry, and dispatches the selected
//! pipeline command.

use std::process::ExitCode;

fn main() -> ExitCode {
    panelshot_cli::run(std::env::args_os())
}

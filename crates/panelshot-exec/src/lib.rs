//! External process execution for the panelshot pipeline.
//!
//! Every tool invocation (composer, php, node, pnpm) flows through this
//! crate: blocking runs with explicit timeouts, fail-fast variants that
//! surface command/exit-code/output, background spawns with log
//! redirection, and forced termination of whatever still listens on a
//! port from a previous run.

mod errors;
mod port;
mod runner;
mod toolchain;

pub use errors::ExecError;
pub use port::{free_port, listening_pids, probe};
pub use runner::{CommandLine, CommandOutput, run, run_ok, spawn_background};
pub use toolchain::Toolchain;

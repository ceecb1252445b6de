//! Lifecycle management for the ephemeral host project.
//!
//! One pipeline run owns one project directory and at most one dev server.
//! The operations here cover the whole lifecycle: scaffolding a disposable
//! Laravel instance, installing the plugin as a symlinked path dependency,
//! splicing the plugin registration into the panel provider, running the
//! publish/post-install/build steps, resolving the hosting mode (spawned
//! fallback server or Herd-style external serving), and tearing everything
//! down again. Teardown is best-effort and never masks the error that
//! triggered it.

mod commands;
mod composer;
mod error;
mod hosting;
mod register;
mod scaffold;

pub use commands::{build_assets, publish_assets, run_post_install};
pub use composer::{add_path_repository, install_plugin};
pub use error::ProjectError;
pub use hosting::{Hosting, ensure_server, wait_until_reachable};
pub use register::register_plugins;
pub use scaffold::{cleanup, create};

//! Command-line builders for the configured external tools.

use std::time::Duration;

use camino::Utf8Path;
use panelshot_config::Config;

use crate::runner::CommandLine;

/// Default timeout for php and node invocations.
const INTERPRETER_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for composer and pnpm invocations, which hit the network.
const PACKAGE_MANAGER_TIMEOUT: Duration = Duration::from_secs(300);

/// Resolved binaries for the external tools the pipeline drives.
#[derive(Debug, Clone)]
pub struct Toolchain {
    php: String,
    composer: String,
    node: String,
    pnpm: String,
}

impl Toolchain {
    /// Binds the toolchain to the configured binary names.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            php: config.php_binary.clone(),
            composer: config.composer_binary.clone(),
            node: config.node_binary.clone(),
            pnpm: config.pnpm_binary.clone(),
        }
    }

    /// A `php` invocation.
    #[must_use]
    pub fn php<I, S>(&self, args: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new(&self.php)
            .args(args)
            .timeout(INTERPRETER_TIMEOUT)
    }

    /// A `php artisan` invocation inside `project_dir`.
    #[must_use]
    pub fn artisan<I, S>(&self, project_dir: &Utf8Path, args: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new(&self.php)
            .arg("artisan")
            .args(args)
            .current_dir(project_dir)
            .timeout(INTERPRETER_TIMEOUT)
    }

    /// A `composer` invocation.
    #[must_use]
    pub fn composer<I, S>(&self, args: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new(&self.composer)
            .args(args)
            .timeout(PACKAGE_MANAGER_TIMEOUT)
    }

    /// A `node` invocation.
    #[must_use]
    pub fn node<I, S>(&self, args: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new(&self.node)
            .args(args)
            .timeout(INTERPRETER_TIMEOUT)
    }

    /// A `pnpm` invocation.
    #[must_use]
    pub fn pnpm<I, S>(&self, args: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new(&self.pnpm)
            .args(args)
            .timeout(PACKAGE_MANAGER_TIMEOUT)
    }
}

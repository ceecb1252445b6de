//! Argument surface of the `panelshot` binary.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "panelshot",
    version,
    about = "Generates documentation screenshots for admin-panel plugins"
)]
pub(crate) struct Cli {
    /// Plugin directory the manifest is loaded from.
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub(crate) path: Utf8PathBuf,
    /// Print the full error source chain on failure.
    #[arg(long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Runs the full pipeline and tears the project down afterwards.
    Run {
        /// Keep the project directory after the run.
        #[arg(long)]
        keep: bool,
        /// Skip seed generation and execution.
        #[arg(long)]
        skip_seed: bool,
        /// Skip the capture stage.
        #[arg(long)]
        skip_capture: bool,
        /// Skip the README update.
        #[arg(long)]
        skip_readme: bool,
    },
    /// Scaffolds and prepares the project, leaving it in place.
    Setup {
        /// Keep the project directory even when setup fails.
        #[arg(long)]
        keep: bool,
    },
    /// Generates and runs seeders against an existing project.
    Seed {
        /// Project directory; defaults to the configured temp dir.
        #[arg(long, value_name = "DIR")]
        project: Option<Utf8PathBuf>,
    },
    /// Runs the capture job against a prepared, served project.
    Capture {
        /// Project directory; defaults to the configured temp dir.
        #[arg(long, value_name = "DIR")]
        project: Option<Utf8PathBuf>,
        /// Restrict the run to one configured theme.
        #[arg(long, value_name = "THEME")]
        theme: Option<String>,
    },
    /// Rebuilds results from artifacts on disk and updates the README.
    Readme,
    /// Removes the project directory.
    Cleanup {
        /// Project directory; defaults to the configured temp dir.
        #[arg(long, value_name = "DIR")]
        project: Option<Utf8PathBuf>,
    },
    /// Validates the manifest, printing a summary or every violation.
    Validate,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn the_argument_surface_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from(["panelshot", "validate", "--path", "/plugins/shop"])
            .expect("arguments should parse");
        assert_eq!(cli.path, Utf8PathBuf::from("/plugins/shop"));
        assert!(matches!(cli.command, Command::Validate));
    }

    #[test]
    fn run_skip_flags_parse_independently() {
        let cli = Cli::try_parse_from(["panelshot", "run", "--keep", "--skip-capture"])
            .expect("arguments should parse");
        match cli.command {
            Command::Run {
                keep,
                skip_seed,
                skip_capture,
                skip_readme,
            } => {
                assert!(keep);
                assert!(!skip_seed);
                assert!(skip_capture);
                assert!(!skip_readme);
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }
}

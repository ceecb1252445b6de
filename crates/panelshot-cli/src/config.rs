//! Configuration argument splitting.
//!
//! Flags destined for the `ortho_config` loader are filtered off the front
//! of the argument list so clap only sees the command tokens. Configuration
//! flags must appear before the subcommand; anything after the first
//! non-configuration token is left for clap.

use std::ffi::{OsStr, OsString};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the overlay fields in
/// `panelshot-config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--php-binary",
    "--composer-binary",
    "--node-binary",
    "--pnpm-binary",
    "--temp-dir",
    "--server-host",
    "--server-port",
    "--server-timeout",
    "--herd-enabled",
    "--herd-dir",
    "--herd-tld",
    "--navigation-timeout",
    "--log-filter",
    "--log-format",
];

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let mut flag_parts = argument_text.splitn(2, '=');
    let flag = flag_parts.next().unwrap_or_default();
    let has_inline_value = flag_parts.next().is_some();

    if CONFIG_CLI_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !has_inline_value,
        };
    }

    FlagAction::Skip
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered: Vec<OsString> = vec![program.clone()];
    let mut command_start = 1usize;
    let mut index = 1usize;
    let mut pending_values = 0usize;

    while index < args.len() {
        let Some(argument) = args.get(index) else {
            break;
        };
        if pending_values > 0 {
            filtered.push(argument.clone());
            pending_values -= 1;
            index += 1;
            command_start = index;
            continue;
        }

        match process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                index += 1;
                command_start = index;
                if needs_value {
                    pending_values = 1;
                }
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}

/// Rebuilds the argument list clap receives: the program name followed by
/// everything after the configuration flags.
pub(crate) fn prepare_cli_arguments(
    args: &[OsString],
    split: &ConfigArgumentSplit,
) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    cli_arguments.extend(args.iter().skip(split.command_start).cloned());
    cli_arguments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn inline_value_flags_do_not_need_a_follow_up_value() {
        let action = process_config_flag(OsStr::new("--log-filter=debug"));
        match action {
            FlagAction::Include { needs_value } => assert!(!needs_value),
            FlagAction::Skip => panic!("expected include for known inline flag"),
        }
    }

    #[test]
    fn separate_value_flags_consume_the_following_argument() {
        let action = process_config_flag(OsStr::new("--server-port"));
        match action {
            FlagAction::Include { needs_value } => assert!(needs_value),
            FlagAction::Skip => panic!("expected include for known separated flag"),
        }
    }

    #[test]
    fn command_tokens_stop_the_scan() {
        let action = process_config_flag(OsStr::new("run"));
        assert!(matches!(action, FlagAction::Skip));
    }

    #[test]
    fn unknown_flags_are_left_for_clap() {
        let action = process_config_flag(OsStr::new("--keep"));
        assert!(matches!(action, FlagAction::Skip));
    }

    #[test]
    fn configuration_flags_split_off_the_front() {
        let args = os(&["panelshot", "--server-port", "9000", "run", "--keep"]);
        let split = split_config_arguments(&args);
        assert_eq!(
            split.config_arguments,
            os(&["panelshot", "--server-port", "9000"])
        );
        assert_eq!(split.command_start, 3);

        let cli_arguments = prepare_cli_arguments(&args, &split);
        assert_eq!(cli_arguments, os(&["panelshot", "run", "--keep"]));
    }

    #[test]
    fn flags_after_the_subcommand_stay_with_clap() {
        let args = os(&["panelshot", "run", "--log-filter=debug"]);
        let split = split_config_arguments(&args);
        assert_eq!(split.config_arguments, os(&["panelshot"]));
        assert_eq!(split.command_start, 1);
    }
}

//! Splicing plugin registrations into panel provider sources.
//!
//! The splice is line-oriented text insertion, not PHP parsing: find the
//! provider for the panel id, add a `use` import after the namespace line,
//! and insert the `->plugin(...)` call before the first recognized anchor
//! in the builder chain, preserving the anchor line's indentation. The
//! operation is idempotent; a provider that already registers the class is
//! left byte-identical.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use panelshot_config::Manifest;
use tracing::{debug, info};

use crate::error::ProjectError;

/// Log target for registration operations.
const REGISTER_TARGET: &str = "panelshot_project::register";

/// Builder-chain call sites the plugin call is spliced before, in priority
/// order.
const ANCHORS: [&str; 4] = [
    "->middleware(",
    "->authMiddleware(",
    "->pages([",
    "->widgets([",
];

/// Registers every configured (class, panel) pair into the project.
pub fn register_plugins(manifest: &Manifest, project_dir: &Utf8Path) -> Result<(), ProjectError> {
    for registration in &manifest.install.plugins {
        register_plugin(project_dir, &registration.class, &registration.panel)?;
    }
    Ok(())
}

fn register_plugin(project_dir: &Utf8Path, class: &str, panel: &str) -> Result<(), ProjectError> {
    let provider = find_provider(project_dir, panel)?;
    let source = fs::read_to_string(&provider).map_err(|source| ProjectError::Io {
        action: "read",
        path: provider.clone(),
        source,
    })?;

    match splice_registration(&source, class) {
        None => {
            debug!(target: REGISTER_TARGET, class, panel, "plugin already registered");
            Ok(())
        }
        Some(updated) => {
            fs::write(&provider, updated).map_err(|source| ProjectError::Io {
                action: "write",
                path: provider.clone(),
                source,
            })?;
            info!(target: REGISTER_TARGET, class, panel, provider = %provider, "plugin registered");
            Ok(())
        }
    }
}

/// Locates the provider file for `panel` under `app/Providers/Filament/`.
///
/// Textual search for the panel's `->id('...')` literal wins; the
/// conventional `{CamelCase(panel)}PanelProvider.php` file name is the
/// fallback.
fn find_provider(project_dir: &Utf8Path, panel: &str) -> Result<Utf8PathBuf, ProjectError> {
    let providers_dir = project_dir.join("app/Providers/Filament");
    let id_literal = format!("->id('{panel}')");

    let mut candidates: Vec<Utf8PathBuf> = providers_dir
        .read_dir_utf8()
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path().to_path_buf())
                .filter(|path| path.extension() == Some("php"))
                .collect()
        })
        .unwrap_or_default();
    candidates.sort();

    for candidate in &candidates {
        if let Ok(text) = fs::read_to_string(candidate) {
            if text.contains(&id_literal) {
                return Ok(candidate.clone());
            }
        }
    }

    let conventional = providers_dir.join(format!("{}PanelProvider.php", camel_case(panel)));
    if conventional.is_file() {
        return Ok(conventional);
    }

    Err(ProjectError::PanelProviderNotFound {
        panel: panel.to_owned(),
    })
}

/// Returns the provider source with `class` registered, or `None` when the
/// registration call is already present.
fn splice_registration(source: &str, class: &str) -> Option<String> {
    let short = class.rsplit('\\').next().unwrap_or(class);
    let call = format!("->plugin({short}::make())");
    if source.contains(&call) {
        return None;
    }

    let with_import = insert_import(source, class);
    Some(insert_call(&with_import, &call))
}

/// Adds `use {class};` after the namespace line when the import is absent.
fn insert_import(source: &str, class: &str) -> String {
    let import = format!("use {class};");
    if source.contains(&import) {
        return source.to_owned();
    }

    let mut lines: Vec<&str> = source.lines().collect();
    let namespace_index = lines
        .iter()
        .position(|line| line.trim_start().starts_with("namespace "));
    // Conventional providers follow the namespace with a blank line and the
    // use block; the new import becomes the first entry of that block.
    let insert_at = match namespace_index {
        Some(index) if lines.get(index + 1).is_some_and(|line| line.is_empty()) => index + 2,
        Some(index) => index + 1,
        None => 0,
    };
    lines.insert(insert_at, &import);
    join_lines(&lines, source)
}

/// Splices the registration call before the first anchor, or before the
/// closing of the `return $panel …;` statement when no anchor matches.
fn insert_call(source: &str, call: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();

    for anchor in ANCHORS {
        let Some(index) = lines.iter().position(|line| line.contains(anchor)) else {
            continue;
        };
        let indent = leading_whitespace(lines.get(index).copied().unwrap_or_default());
        let mut updated = lines.clone();
        let inserted = format!("{indent}{call}");
        updated.insert(index, &inserted);
        return join_lines(&updated, source);
    }

    fallback_before_statement_end(&lines, call, source)
}

/// No anchor matched: insert before the `;` terminating the `return $panel`
/// statement, indented one level past the `return` line.
fn fallback_before_statement_end(lines: &[&str], call: &str, source: &str) -> String {
    let Some(return_index) = lines
        .iter()
        .position(|line| line.contains("return $panel"))
    else {
        return source.to_owned();
    };
    let Some(end_index) = lines
        .iter()
        .enumerate()
        .skip(return_index)
        .find_map(|(index, line)| line.trim_end().ends_with(';').then_some(index))
    else {
        return source.to_owned();
    };

    let indent = format!(
        "{}    ",
        leading_whitespace(lines.get(return_index).copied().unwrap_or_default())
    );
    let end_line = lines.get(end_index).copied().unwrap_or_default();

    let mut updated: Vec<String> = lines.iter().map(|line| (*line).to_owned()).collect();
    if end_index == return_index || end_line.trim() == ";" {
        // The terminator sits on its own line (or with the return); splice a
        // full line above it.
        updated.insert(end_index, format!("{indent}{call}"));
    } else if let Some(stripped) = end_line.trim_end().strip_suffix(';') {
        updated[end_index] = format!("{stripped}\n{indent}{call};", indent = indent);
    }
    let mut rendered = updated.join("\n");
    if source.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

fn leading_whitespace(line: &str) -> String {
    line.chars().take_while(|ch| ch.is_whitespace()).collect()
}

fn join_lines(lines: &[&str], original: &str) -> String {
    let mut rendered = lines.join("\n");
    if original.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

fn camel_case(stem: &str) -> String {
    stem.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect()
}

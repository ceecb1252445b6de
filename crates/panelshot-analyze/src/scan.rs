//! Source-tree scanning: registration class, resources, fields.

use std::collections::HashMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::composer::read_manifest;
use crate::error::AnalysisError;
use crate::types::{FieldInfo, FieldKind, PluginAnalysis, ResourceInfo};

/// Log target for scan operations.
const SCAN_TARGET: &str = "panelshot_analyze::scan";

/// Sentinel used when no registration class is found.
const UNKNOWN_CLASS: &str = "unknown";

/// Namespace models fall under when nothing more specific is known.
const DEFAULT_MODEL_NAMESPACE: &str = "App\\Models";

/// Longest method-chain window inspected after a field builder.
const CHAIN_WINDOW: usize = 4000;

static NAMESPACE: Lazy<Regex> = Lazy::new(|| pattern(r"(?m)^namespace\s+([A-Za-z0-9_\\]+)\s*;"));
static PLUGIN_CLASS: Lazy<Regex> =
    Lazy::new(|| pattern(r"class\s+(\w+)[^{]*\b(?:extends|implements)\b[^{]*\bPlugin\b"));
static RESOURCE_CLASS: Lazy<Regex> =
    Lazy::new(|| pattern(r"class\s+(\w+)\s+extends\s+[A-Za-z0-9_\\]*Resource\b"));
static RELATION_MANAGER: Lazy<Regex> =
    Lazy::new(|| pattern(r"extends\s+[A-Za-z0-9_\\]*RelationManager\b"));
static MODEL_DECL: Lazy<Regex> = Lazy::new(|| {
    pattern(r"protected\s+static\s+\?string\s+\$model\s*=\s*\\?([A-Za-z0-9_\\]+)::class")
});
static USE_IMPORT: Lazy<Regex> = Lazy::new(|| pattern(r"(?m)^use\s+([A-Za-z0-9_\\]+)\s*;"));
static FIELD_MAKE: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b([A-Z][A-Za-z]*)::make\(\s*'([^']+)'\s*\)"));
static OPTION_PAIR: Lazy<Regex> = Lazy::new(|| pattern(r"'([^']*)'\s*=>\s*'([^']*)'"));

fn pattern(source: &str) -> Regex {
    #[expect(clippy::expect_used, reason = "patterns are static and covered by tests")]
    Regex::new(source).expect("static pattern must compile")
}

/// Scans `plugin_dir` and recovers its implicit data model.
///
/// Fails only when `composer.json` is missing or unparseable; an absent or
/// unreadable `src/` yields an empty resource list and the sentinel
/// registration class.
pub fn analyze(plugin_dir: &Utf8Path) -> Result<PluginAnalysis, AnalysisError> {
    let manifest = read_manifest(plugin_dir)?;
    let source_dir = plugin_dir.join("src");

    let plugin_class = find_plugin_class(&source_dir);
    let resources = find_resources(&source_dir);

    debug!(
        target: SCAN_TARGET,
        package = manifest.package,
        plugin_class,
        resources = resources.len(),
        "plugin analyzed"
    );

    Ok(PluginAnalysis {
        plugin_class,
        package: manifest.package,
        framework_version: manifest.framework_version,
        resources,
    })
}

/// Finds the registration entry point among the files directly under `src/`.
fn find_plugin_class(source_dir: &Utf8Path) -> String {
    for path in sorted_php_files(source_dir) {
        let Ok(text) = fs::read_to_string(&path) else {
            continue;
        };
        if let Some(captures) = PLUGIN_CLASS.captures(&text) {
            let class = captures.get(1).map_or("", |m| m.as_str());
            return qualify(&text, class);
        }
    }
    UNKNOWN_CLASS.to_owned()
}

/// Non-recursive, name-sorted listing of `.php` files in `dir`.
fn sorted_php_files(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let Ok(entries) = dir.read_dir_utf8() else {
        return Vec::new();
    };
    let mut files: Vec<Utf8PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| path.extension() == Some("php") && path.is_file())
        .collect();
    files.sort();
    files
}

/// Recursively collects resource definitions under `src/`.
fn find_resources(source_dir: &Utf8Path) -> Vec<ResourceInfo> {
    let mut resources = Vec::new();
    let walker = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok);
    for entry in walker {
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if !entry.file_type().is_file() || !path.as_str().ends_with("Resource.php") {
            continue;
        }
        let Ok(text) = fs::read_to_string(path) else {
            warn!(target: SCAN_TARGET, %path, "unreadable resource file skipped");
            continue;
        };
        if let Some(resource) = parse_resource(&text) {
            resources.push(resource);
        }
    }
    resources
}

/// Parses one candidate resource file, or `None` when it is not a resource.
fn parse_resource(text: &str) -> Option<ResourceInfo> {
    // Relation managers can match the *Resource.php name pattern; they are
    // not entities and are excluded outright.
    if RELATION_MANAGER.is_match(text) {
        return None;
    }
    let captures = RESOURCE_CLASS.captures(text)?;
    let class_name = captures.get(1).map(|m| m.as_str().to_owned())?;

    let model = resolve_model(text, &class_name);
    let short_name = short_name_of(&model);
    let fields = extract_fields(text);

    Some(ResourceInfo {
        class: qualify(text, &class_name),
        model,
        short_name,
        fields,
    })
}

/// Prefixes `class` with the file's namespace, when one is declared.
fn qualify(text: &str, class: &str) -> String {
    NAMESPACE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or_else(|| class.to_owned(), |ns| format!("{}\\{class}", ns.as_str()))
}

/// Resolves the bound model from the declaration, imports, or class name.
fn resolve_model(text: &str, class_name: &str) -> String {
    if let Some(captures) = MODEL_DECL.captures(text) {
        let identifier = captures.get(1).map_or("", |m| m.as_str());
        if identifier.contains('\\') {
            return identifier.to_owned();
        }
        if let Some(imported) = resolve_import(text, identifier) {
            return imported;
        }
        return format!("{DEFAULT_MODEL_NAMESPACE}\\{identifier}");
    }
    let stem = class_name.strip_suffix("Resource").unwrap_or(class_name);
    format!("{DEFAULT_MODEL_NAMESPACE}\\{stem}")
}

/// Looks up `short` among the file's `use` imports.
fn resolve_import(text: &str, short: &str) -> Option<String> {
    USE_IMPORT
        .captures_iter(text)
        .map(|captures| captures.get(1).map_or("", |m| m.as_str()).to_owned())
        .find(|import| short_name_of(import) == short)
}

/// Final path segment of a backslash-qualified identifier.
fn short_name_of(identifier: &str) -> String {
    identifier
        .rsplit('\\')
        .next()
        .unwrap_or(identifier)
        .to_owned()
}

/// Extracts every recognized field-builder invocation from the file.
fn extract_fields(text: &str) -> Vec<FieldInfo> {
    let mut fields = Vec::new();
    for captures in FIELD_MAKE.captures_iter(text) {
        let builder = captures.get(1).map_or("", |m| m.as_str());
        let Some(kind) = FieldKind::recognize(builder) else {
            continue;
        };
        let name = captures.get(2).map_or("", |m| m.as_str()).to_owned();
        let chain_start = captures.get(0).map_or(0, |m| m.end());
        let chain = chain_after(text, chain_start);
        fields.push(build_field(name, kind, chain));
    }
    fields
}

/// Populates modifiers, relation hint, and options from the chain text.
fn build_field(name: String, kind: FieldKind, chain: &str) -> FieldInfo {
    let mut field = FieldInfo::new(name, kind);
    field.required = chain.contains("->required(");
    field.numeric = chain.contains("->numeric(");
    if kind == FieldKind::Select {
        if let Some(stem) = field.name.strip_suffix("_id") {
            field.relation_model = Some(format!("{DEFAULT_MODEL_NAMESPACE}\\{}", camel_case(stem)));
        }
        field.options = extract_options(chain);
    }
    field
}

/// The method-chain text following a builder invocation, bounded by a
/// balanced-parenthesis boundary or the next structural comma/bracket.
fn chain_after(text: &str, start: usize) -> &str {
    let tail = text.get(start..).unwrap_or_default();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, ch) in tail.char_indices().take(CHAIN_WINDOW) {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' => depth += 1,
            ')' | ']' if depth > 0 => depth -= 1,
            ')' | ']' => return tail.get(..offset).unwrap_or_default(),
            ',' | ';' if depth == 0 => return tail.get(..offset).unwrap_or_default(),
            _ => {}
        }
    }
    tail.get(..tail.len().min(CHAIN_WINDOW)).unwrap_or(tail)
}

/// Inline `'value' => 'label'` pairs inside an `->options(` call.
///
/// Dynamic option sources (queries, enum casts) contain no simple quoted
/// pairs and therefore yield no options.
fn extract_options(chain: &str) -> Vec<(String, String)> {
    let Some(start) = chain.find("->options(") else {
        return Vec::new();
    };
    let segment = chain_after(chain, start + "->options(".len());
    OPTION_PAIR
        .captures_iter(segment)
        .map(|captures| {
            (
                captures.get(1).map_or("", |m| m.as_str()).to_owned(),
                captures.get(2).map_or("", |m| m.as_str()).to_owned(),
            )
        })
        .collect()
}

/// Upper-camel-cases a snake_case stem, e.g. `product_category` →
/// `ProductCategory`.
fn camel_case(stem: &str) -> String {
    stem.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect()
}

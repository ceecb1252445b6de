//! Data model recovered from a plugin scan.

use std::str::FromStr;

use strum::{Display, EnumString};

use crate::composer::FrameworkVersion;

/// Closed set of recognized field-builder component kinds.
///
/// The string form is the PHP builder class name as it appears in
/// `Kind::make('...')` invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum FieldKind {
    /// Single-line text input.
    TextInput,
    /// Multi-line plain text.
    Textarea,
    /// Rich-text (HTML) editor.
    RichEditor,
    /// Markdown editor.
    MarkdownEditor,
    /// Boolean toggle.
    Toggle,
    /// Boolean checkbox.
    Checkbox,
    /// Dropdown selection.
    Select,
    /// Date picker.
    DatePicker,
    /// Date and time picker.
    DateTimePicker,
    /// Colour picker.
    ColorPicker,
    /// File upload; synthetic values are never generated for it.
    FileUpload,
    /// Key/value map editor.
    KeyValue,
    /// Repeating sub-form.
    Repeater,
    /// Hidden input.
    Hidden,
    /// Tag list input.
    TagsInput,
}

impl FieldKind {
    /// Parses a builder class name into a kind, if recognized.
    #[must_use]
    pub fn recognize(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }
}

/// One field detected on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Column name as passed to `::make('...')`.
    pub name: String,
    /// UI component kind.
    pub kind: FieldKind,
    /// Whether the chain carries a `->required(` modifier.
    pub required: bool,
    /// Whether the chain carries a `->numeric(` modifier.
    pub numeric: bool,
    /// Fully-qualified model a select foreign key points at.
    ///
    /// Set only when the kind is [`FieldKind::Select`] and the field name
    /// ends in `_id`.
    pub relation_model: Option<String>,
    /// Inline enumerated options as ordered (value, label) pairs.
    pub options: Vec<(String, String)>,
}

impl FieldInfo {
    /// Starts a field with no modifiers set.
    #[must_use]
    pub const fn new(name: String, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            numeric: false,
            relation_model: None,
            options: Vec::new(),
        }
    }
}

/// One detected declarative entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Fully-qualified resource class owning the definition.
    pub class: String,
    /// Fully-qualified backing model identifier.
    pub model: String,
    /// Short model name, e.g. `Product` for `App\Models\Product`.
    pub short_name: String,
    /// Detected fields in source order.
    pub fields: Vec<FieldInfo>,
}

/// Aggregate result of one plugin scan. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginAnalysis {
    /// Fully-qualified registration class, or `"unknown"`.
    pub plugin_class: String,
    /// Composer package identifier from the manifest, or `"unknown"`.
    pub package: String,
    /// Detected host-framework major version.
    pub framework_version: FrameworkVersion,
    /// Detected resources in deterministic (name-sorted file) order.
    pub resources: Vec<ResourceInfo>,
}

impl PluginAnalysis {
    /// Looks up a resource by its short model name, case-insensitively.
    #[must_use]
    pub fn resource_by_short_name(&self, short_name: &str) -> Option<&ResourceInfo> {
        self.resources
            .iter()
            .find(|resource| resource.short_name.eq_ignore_ascii_case(short_name))
    }
}

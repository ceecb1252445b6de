//! Field-to-faker expression mapping.

use panelshot_analyze::{FieldInfo, FieldKind};

/// PHP faker expression generating a synthetic value for `field`.
///
/// Returns `None` for kinds with no sensible synthetic value (file
/// uploads); the field is then omitted from the generated definition
/// rather than guessed. Rules are deterministic, first match wins.
#[must_use]
pub fn faker_expression(field: &FieldInfo) -> Option<String> {
    let expression = match field.kind {
        FieldKind::TextInput | FieldKind::Hidden => text_expression(field),
        FieldKind::Textarea => "fake()->paragraph()".to_owned(),
        FieldKind::RichEditor | FieldKind::MarkdownEditor => {
            "'<p>' . fake()->paragraph() . '</p>'".to_owned()
        }
        FieldKind::Toggle | FieldKind::Checkbox => "fake()->boolean()".to_owned(),
        FieldKind::Select => select_expression(field),
        FieldKind::DatePicker => "fake()->date()".to_owned(),
        FieldKind::DateTimePicker => "fake()->dateTime()".to_owned(),
        FieldKind::ColorPicker => "fake()->hexColor()".to_owned(),
        FieldKind::FileUpload => return None,
        FieldKind::KeyValue | FieldKind::Repeater | FieldKind::TagsInput => {
            "fake()->word()".to_owned()
        }
    };
    Some(expression)
}

/// Name-based rules for plain text inputs.
fn text_expression(field: &FieldInfo) -> String {
    let name = field.name.to_ascii_lowercase();
    if name.contains("email") {
        "fake()->safeEmail()".to_owned()
    } else if name.contains("name") {
        "fake()->name()".to_owned()
    } else if name.contains("title") {
        "fake()->sentence(4)".to_owned()
    } else if name.contains("phone") {
        "fake()->phoneNumber()".to_owned()
    } else if name.contains("url") || name.contains("website") {
        "fake()->url()".to_owned()
    } else if field.numeric {
        "fake()->numberBetween(0, 100)".to_owned()
    } else {
        "fake()->word()".to_owned()
    }
}

/// Selects reference a factory when a relation is known, otherwise a random
/// declared option, otherwise a word.
fn select_expression(field: &FieldInfo) -> String {
    if let Some(model) = &field.relation_model {
        return format!("\\{model}::factory()");
    }
    if field.options.is_empty() {
        return "fake()->word()".to_owned();
    }
    let values: Vec<String> = field
        .options
        .iter()
        .map(|(value, _)| format!("'{value}'"))
        .collect();
    format!("fake()->randomElement([{}])", values.join(", "))
}

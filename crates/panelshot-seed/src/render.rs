//! PHP source rendering for seed units.

use panelshot_config::UserSection;
use serde_json::{Map, Value};

/// Class name of the generated master seeder.
pub const MASTER_SEEDER_CLASS: &str = "PanelshotSeeder";

/// Class name of the generated user seeder.
pub const USER_SEEDER_CLASS: &str = "PanelshotUserSeeder";

/// Seeder creating the synthetic login user, keyed by email so re-running
/// the seed stage is idempotent.
#[must_use]
pub fn render_user_seeder(user: &UserSection) -> String {
    format!(
        "<?php

namespace Database\\Seeders;

use App\\Models\\User;
use Illuminate\\Database\\Seeder;
use Illuminate\\Support\\Facades\\Hash;

class {USER_SEEDER_CLASS} extends Seeder
{{
    public function run(): void
    {{
        User::updateOrCreate(
            ['email' => {email}],
            [
                'name' => {name},
                'password' => Hash::make({password}),
            ],
        );
    }}
}}
",
        email = php_string(&user.email),
        name = php_string(&user.name),
        password = php_string(&user.password),
    )
}

/// Factory for one entity; `definitions` pairs column names with faker
/// expressions.
#[must_use]
pub fn render_factory(model: &str, short_name: &str, definitions: &[(String, String)]) -> String {
    let mut body = String::new();
    for (column, expression) in definitions {
        body.push_str(&format!("            '{column}' => {expression},\n"));
    }
    format!(
        "<?php

namespace Database\\Factories;

use Illuminate\\Database\\Eloquent\\Factories\\Factory;

class {short_name}Factory extends Factory
{{
    protected $model = \\{model}::class;

    public function definition(): array
    {{
        return [
{body}        ];
    }}
}}
"
    )
}

/// Seeder creating `count` factory-built rows of one entity.
#[must_use]
pub fn render_seeder(model: &str, short_name: &str, count: u32) -> String {
    format!(
        "<?php

namespace Database\\Seeders;

use Illuminate\\Database\\Seeder;

class {short_name}Seeder extends Seeder
{{
    public function run(): void
    {{
        \\{model}::factory()->count({count})->create();
    }}
}}
"
    )
}

/// Seeder for an explicitly configured model, with optional literal
/// attribute overrides applied to every created row.
#[must_use]
pub fn render_explicit_seeder(
    model: &str,
    short_name: &str,
    count: u32,
    attributes: Option<&Map<String, Value>>,
) -> String {
    let creation = attributes.map_or_else(
        || format!("\\{model}::factory()->count({count})->create();"),
        |map| {
            let mut literals = String::new();
            for (key, value) in map {
                literals.push_str(&format!(
                    "            '{key}' => {},\n",
                    php_literal(value)
                ));
            }
            format!("\\{model}::factory()->count({count})->create([\n{literals}        ]);")
        },
    );
    format!(
        "<?php

namespace Database\\Seeders;

use Illuminate\\Database\\Seeder;

class {short_name}Seeder extends Seeder
{{
    public function run(): void
    {{
        {creation}
    }}
}}
"
    )
}

/// Master seeder invoking every other seeder class in order.
#[must_use]
pub fn render_master_seeder(seeder_classes: &[String]) -> String {
    let mut calls = String::new();
    for class in seeder_classes {
        calls.push_str(&format!("            {class}::class,\n"));
    }
    format!(
        "<?php

namespace Database\\Seeders;

use Illuminate\\Database\\Seeder;

class {MASTER_SEEDER_CLASS} extends Seeder
{{
    public function run(): void
    {{
        $this->call([
{calls}        ]);
    }}
}}
"
    )
}

/// Renders a JSON attribute value as a PHP literal.
fn php_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => php_string(text),
        // Nested structures are rare in overrides; render them as a PHP
        // array literal.
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(php_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, item)| format!("'{key}' => {}", php_literal(item)))
                .collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

/// Single-quoted PHP string with escaping.
fn php_string(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_seeder_is_keyed_by_email() {
        let rendered = render_user_seeder(&UserSection::default());
        assert!(rendered.contains("class PanelshotUserSeeder extends Seeder"));
        assert!(rendered.contains("['email' => 'admin@example.com']"));
        assert!(rendered.contains("Hash::make('password')"));
    }

    #[test]
    fn factories_bind_the_model_and_list_definitions() {
        let rendered = render_factory(
            "App\\Models\\Product",
            "Product",
            &[
                ("name".to_owned(), "fake()->name()".to_owned()),
                (
                    "category_id".to_owned(),
                    "\\App\\Models\\Category::factory()".to_owned(),
                ),
            ],
        );
        assert!(rendered.contains("class ProductFactory extends Factory"));
        assert!(rendered.contains("protected $model = \\App\\Models\\Product::class;"));
        assert!(rendered.contains("'name' => fake()->name(),"));
        assert!(rendered.contains("'category_id' => \\App\\Models\\Category::factory(),"));
    }

    #[test]
    fn explicit_seeders_render_literal_attributes() {
        let mut attributes = Map::new();
        attributes.insert("status".to_owned(), Value::String("published".to_owned()));
        attributes.insert("stock".to_owned(), Value::Number(5.into()));
        attributes.insert("archived".to_owned(), Value::Bool(false));

        let rendered =
            render_explicit_seeder("App\\Models\\Product", "Product", 3, Some(&attributes));
        assert!(rendered.contains("->count(3)->create([\n"));
        assert!(rendered.contains("'status' => 'published',"));
        assert!(rendered.contains("'stock' => 5,"));
        assert!(rendered.contains("'archived' => false,"));
    }

    #[test]
    fn explicit_seeders_without_attributes_use_plain_creation() {
        let rendered = render_explicit_seeder("App\\Models\\Product", "Product", 10, None);
        assert!(rendered.contains("\\App\\Models\\Product::factory()->count(10)->create();"));
    }

    #[test]
    fn master_seeder_calls_in_given_order() {
        let rendered = render_master_seeder(&[
            "PanelshotUserSeeder".to_owned(),
            "CategorySeeder".to_owned(),
            "ProductSeeder".to_owned(),
        ]);
        let user = rendered.find("PanelshotUserSeeder::class").unwrap_or(0);
        let category = rendered.find("CategorySeeder::class").unwrap_or(0);
        let product = rendered.find("ProductSeeder::class").unwrap_or(0);
        assert!(user < category && category < product);
    }

    #[test]
    fn strings_escape_quotes_and_backslashes() {
        assert_eq!(php_string("it's"), "'it\\'s'");
        assert_eq!(php_string("a\\b"), "'a\\\\b'");
    }
}

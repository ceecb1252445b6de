//! Seed-plan assembly from analysis output and the manifest seed section.

use camino::Utf8PathBuf;
use panelshot_analyze::{PluginAnalysis, ResourceInfo};
use panelshot_config::{SeedSection, UserSection};
use serde_json::{Map, Value};
use tracing::debug;

use crate::faker::faker_expression;
use crate::graph::DependencyGraph;
use crate::render;

/// Log target for planning operations.
const PLAN_TARGET: &str = "panelshot_seed::plan";

/// Rows created per auto-detected entity.
const AUTO_SEED_COUNT: u32 = 10;

/// One generated source unit of the seed plan.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedUnit {
    /// Seeder creating the synthetic login user; always runs first.
    UserSeeder {
        /// Credentials from the manifest.
        user: UserSection,
    },
    /// Factory for one entity.
    Factory {
        /// Fully-qualified model class.
        model: String,
        /// Short model name used in class and file names.
        short_name: String,
        /// Column name → faker expression, in field order.
        definitions: Vec<(String, String)>,
    },
    /// Seeder creating factory-built rows for one auto-detected entity.
    Seeder {
        /// Fully-qualified model class.
        model: String,
        /// Short model name.
        short_name: String,
        /// Rows to create.
        count: u32,
    },
    /// Seeder for an explicitly configured model.
    ExplicitSeeder {
        /// Fully-qualified model class.
        model: String,
        /// Short model name.
        short_name: String,
        /// Rows to create.
        count: u32,
        /// Literal attribute overrides, when configured.
        attributes: Option<Map<String, Value>>,
    },
    /// Master seeder invoking all others; always last.
    MasterSeeder {
        /// Seeder class names in invocation order.
        seeder_classes: Vec<String>,
    },
}

impl SeedUnit {
    /// Path of the rendered file relative to the project root.
    #[must_use]
    pub fn relative_path(&self) -> Utf8PathBuf {
        match self {
            Self::UserSeeder { .. } => {
                Utf8PathBuf::from(format!("database/seeders/{}.php", render::USER_SEEDER_CLASS))
            }
            Self::Factory { short_name, .. } => {
                Utf8PathBuf::from(format!("database/factories/{short_name}Factory.php"))
            }
            Self::Seeder { short_name, .. } | Self::ExplicitSeeder { short_name, .. } => {
                Utf8PathBuf::from(format!("database/seeders/{short_name}Seeder.php"))
            }
            Self::MasterSeeder { .. } => Utf8PathBuf::from(format!(
                "database/seeders/{}.php",
                render::MASTER_SEEDER_CLASS
            )),
        }
    }

    /// Renders the unit to PHP source text.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::UserSeeder { user } => render::render_user_seeder(user),
            Self::Factory {
                model,
                short_name,
                definitions,
            } => render::render_factory(model, short_name, definitions),
            Self::Seeder {
                model,
                short_name,
                count,
            } => render::render_seeder(model, short_name, *count),
            Self::ExplicitSeeder {
                model,
                short_name,
                count,
                attributes,
            } => render::render_explicit_seeder(model, short_name, *count, attributes.as_ref()),
            Self::MasterSeeder { seeder_classes } => {
                render::render_master_seeder(seeder_classes)
            }
        }
    }

    /// Whether an existing file at the unit's path is kept instead of
    /// overwritten. Only factories yield to project-provided files.
    #[must_use]
    pub const fn keeps_existing(&self) -> bool {
        matches!(self, Self::Factory { .. })
    }
}

/// Ordered list of generator units for one run.
#[derive(Debug, Default)]
pub struct SeedPlan {
    /// Units in write order; the master seeder is last.
    pub units: Vec<SeedUnit>,
}

/// Plans seed units from the analysis and the manifest's seed section.
///
/// Explicit per-model entries take precedence: an auto-detected entity whose
/// short name matches an explicit entry (case-insensitively) gets no
/// auto-generated seeder. Auto-detected entities are seeded in dependency
/// order; the user seeder always runs first.
#[must_use]
pub fn plan(analysis: &PluginAnalysis, seed: &SeedSection) -> SeedPlan {
    let mut units = vec![SeedUnit::UserSeeder {
        user: seed.user.clone(),
    }];
    let mut seeder_classes = vec![render::USER_SEEDER_CLASS.to_owned()];

    let explicit_shorts: Vec<String> = seed
        .models
        .iter()
        .map(|entry| short_name_of(&entry.model))
        .collect();

    for entry in &seed.models {
        let short_name = short_name_of(&entry.model);
        seeder_classes.push(format!("{short_name}Seeder"));
        units.push(SeedUnit::ExplicitSeeder {
            model: entry.model.clone(),
            short_name,
            count: entry.count,
            attributes: entry.attributes.clone(),
        });
    }

    if seed.auto_detect {
        for short_name in seeding_order(analysis) {
            let Some(resource) = analysis.resource_by_short_name(&short_name) else {
                continue;
            };
            units.push(factory_unit(resource));
            let covered = explicit_shorts
                .iter()
                .any(|explicit| explicit.eq_ignore_ascii_case(&short_name));
            if covered {
                debug!(
                    target: PLAN_TARGET,
                    entity = short_name,
                    "explicit seed entry covers auto-detected entity"
                );
                continue;
            }
            seeder_classes.push(format!("{short_name}Seeder"));
            units.push(SeedUnit::Seeder {
                model: resource.model.clone(),
                short_name,
                count: AUTO_SEED_COUNT,
            });
        }
    }

    units.push(SeedUnit::MasterSeeder { seeder_classes });
    SeedPlan { units }
}

/// Topological order over the analysis' entities, dependencies first.
fn seeding_order(analysis: &PluginAnalysis) -> Vec<String> {
    let mut graph = DependencyGraph::new();
    for resource in &analysis.resources {
        graph.add_node(resource.short_name.clone());
    }
    for resource in &analysis.resources {
        for dependency in field_dependencies(resource, analysis) {
            graph.add_edge(&resource.short_name, &dependency);
        }
    }
    graph.ordered()
}

/// Short names of entities a resource's fields reference.
fn field_dependencies(resource: &ResourceInfo, analysis: &PluginAnalysis) -> Vec<String> {
    let mut dependencies = Vec::new();
    for field in &resource.fields {
        let hinted = field
            .relation_model
            .as_deref()
            .map(short_name_of)
            .or_else(|| field.name.strip_suffix("_id").map(camel_case));
        let Some(hint) = hinted else {
            continue;
        };
        if let Some(target) = analysis.resource_by_short_name(&hint) {
            dependencies.push(target.short_name.clone());
        }
    }
    dependencies
}

/// Factory unit for one analysed resource; unsupported fields are omitted.
fn factory_unit(resource: &ResourceInfo) -> SeedUnit {
    let definitions = resource
        .fields
        .iter()
        .filter_map(|field| {
            faker_expression(field).map(|expression| (field.name.clone(), expression))
        })
        .collect();
    SeedUnit::Factory {
        model: resource.model.clone(),
        short_name: resource.short_name.clone(),
        definitions,
    }
}

/// Final path segment of a backslash-qualified identifier.
fn short_name_of(identifier: &str) -> String {
    identifier
        .rsplit('\\')
        .next()
        .unwrap_or(identifier)
        .to_owned()
}

/// Upper-camel-cases a snake_case stem.
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

#[cfg(test)]
mod tests {
    use panelshot_analyze::{FieldInfo, FieldKind, FrameworkVersion};
    use panelshot_config::ModelSeed;

    use super::*;

    fn text_field(name: &str) -> FieldInfo {
        FieldInfo::new(name.to_owned(), FieldKind::TextInput)
    }

    fn select_relation(name: &str, model: &str) -> FieldInfo {
        let mut field = FieldInfo::new(name.to_owned(), FieldKind::Select);
        field.relation_model = Some(model.to_owned());
        field
    }

    fn resource(short_name: &str, fields: Vec<FieldInfo>) -> ResourceInfo {
        ResourceInfo {
            class: format!("Acme\\{short_name}Resource"),
            model: format!("App\\Models\\{short_name}"),
            short_name: short_name.to_owned(),
            fields,
        }
    }

    fn shop_analysis() -> PluginAnalysis {
        let mut price = text_field("price");
        price.numeric = true;
        PluginAnalysis {
            plugin_class: "Acme\\ShopPlugin".to_owned(),
            package: "acme/shop".to_owned(),
            framework_version: FrameworkVersion::V5,
            resources: vec![
                resource(
                    "Product",
                    vec![
                        text_field("name"),
                        price,
                        select_relation("category_id", "App\\Models\\Category"),
                    ],
                ),
                resource("Category", vec![text_field("name")]),
            ],
        }
    }

    fn seeder_order(plan: &SeedPlan) -> Vec<String> {
        plan.units
            .iter()
            .rev()
            .find_map(|unit| match unit {
                SeedUnit::MasterSeeder { seeder_classes } => Some(seeder_classes.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[test]
    fn dependencies_are_seeded_before_dependents() {
        let built = plan(&shop_analysis(), &SeedSection::default());
        assert_eq!(
            seeder_order(&built),
            ["PanelshotUserSeeder", "CategorySeeder", "ProductSeeder"]
        );
    }

    #[test]
    fn numeric_fields_use_the_bounded_integer_rule() {
        let built = plan(&shop_analysis(), &SeedSection::default());
        let definitions = built
            .units
            .iter()
            .find_map(|unit| match unit {
                SeedUnit::Factory {
                    short_name,
                    definitions,
                    ..
                } if short_name == "Product" => Some(definitions.clone()),
                _ => None,
            })
            .unwrap_or_default();
        assert!(definitions.contains(&(
            "price".to_owned(),
            "fake()->numberBetween(0, 100)".to_owned()
        )));
        assert!(definitions.contains(&(
            "category_id".to_owned(),
            "\\App\\Models\\Category::factory()".to_owned()
        )));
    }

    #[test]
    fn explicit_entries_suppress_auto_detected_seeders() {
        let seed = SeedSection {
            models: vec![ModelSeed {
                model: "App\\Models\\Product".to_owned(),
                count: 3,
                attributes: None,
            }],
            ..SeedSection::default()
        };
        let built = plan(&shop_analysis(), &seed);

        let auto_product = built.units.iter().any(|unit| {
            matches!(unit, SeedUnit::Seeder { short_name, .. } if short_name == "Product")
        });
        assert!(!auto_product, "explicit entry must win over auto-detection");

        // The factory is still generated so the explicit seeder can call it.
        let has_factory = built.units.iter().any(|unit| {
            matches!(unit, SeedUnit::Factory { short_name, .. } if short_name == "Product")
        });
        assert!(has_factory);

        assert_eq!(
            seeder_order(&built),
            ["PanelshotUserSeeder", "ProductSeeder", "CategorySeeder"]
        );
    }

    #[test]
    fn id_suffix_heuristic_orders_without_relation_metadata() {
        let analysis = PluginAnalysis {
            plugin_class: "unknown".to_owned(),
            package: "acme/blog".to_owned(),
            framework_version: FrameworkVersion::Unknown,
            resources: vec![
                resource("Comment", vec![text_field("body"), text_field("post_id")]),
                resource("Post", vec![text_field("title")]),
            ],
        };
        let built = plan(&analysis, &SeedSection::default());
        assert_eq!(
            seeder_order(&built),
            ["PanelshotUserSeeder", "PostSeeder", "CommentSeeder"]
        );
    }

    #[test]
    fn auto_detection_can_be_disabled() {
        let seed = SeedSection {
            auto_detect: false,
            ..SeedSection::default()
        };
        let built = plan(&shop_analysis(), &seed);
        assert_eq!(seeder_order(&built), ["PanelshotUserSeeder"]);
        assert_eq!(built.units.len(), 2);
    }
}

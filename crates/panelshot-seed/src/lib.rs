//! Seed planning and generation for the ephemeral project.
//!
//! The planner turns a [`panelshot_analyze::PluginAnalysis`] and the
//! manifest's seed section into an ordered list of generator units: a user
//! seeder, per-entity factories and seeders, explicit-model seeders, and one
//! master seeder that invokes all others in dependency order. Rendered units
//! are PHP source files placed under the project's `database/factories` and
//! `database/seeders` trees and executed once through `php artisan db:seed`.

mod error;
mod faker;
mod graph;
mod plan;
mod render;
mod service;

pub use error::SeedError;
pub use faker::faker_expression;
pub use graph::DependencyGraph;
pub use plan::{SeedPlan, SeedUnit, plan};
pub use service::{run_seeders, write_plan};

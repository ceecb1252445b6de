//! Static analysis of a Filament plugin's source tree.
//!
//! The analyzer recovers an implicit data model from the plugin's
//! declarative resource classes: which entities exist, which fields they
//! carry, which fields look like foreign keys, and which framework major
//! version the plugin targets. Extraction is regex/lexical matching over
//! source text, not a PHP parser; the documented fallbacks make it a
//! best-effort pass isolated behind [`PluginAnalysis`] so a proper parser
//! could replace it without touching the seed planner or the lifecycle
//! manager.

mod composer;
mod error;
mod scan;
mod types;

pub use composer::FrameworkVersion;
pub use error::AnalysisError;
pub use scan::analyze;
pub use types::{FieldInfo, FieldKind, PluginAnalysis, ResourceInfo};

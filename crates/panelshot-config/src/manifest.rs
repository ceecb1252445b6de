//! Typed model of the per-plugin `panelshot.json` manifest.
//!
//! Every section beyond `plugin` is optional and falls back to defaults, so
//! a minimal manifest only names the plugin and the screenshots to take.
//! Validation happens on the raw JSON document before these types are
//! constructed (see [`crate::validate_document`]); by the time a [`Manifest`]
//! exists its closed-set fields are known to hold legal values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::defaults;

/// Closed set of capture themes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Theme {
    /// Light colour scheme.
    Light,
    /// Dark colour scheme.
    Dark,
}

/// Closed set of output image formats.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ImageFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// JPEG.
    Jpg,
    /// WebP.
    Webp,
}

impl ImageFormat {
    /// File extension for artifacts in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
        }
    }
}

/// Pre-capture actions understood by the capture worker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BeforeActionKind {
    /// Click the element at `selector`.
    Click,
    /// Hover the element at `selector`.
    Hover,
    /// Pause for `delay` milliseconds.
    Wait,
    /// Type `value` into the element at `selector`.
    Type,
    /// Choose `value` in the select element at `selector`.
    Select,
    /// Scroll the element at `selector` into view.
    Scroll,
}

/// One step executed by the worker before a screenshot is taken.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BeforeAction {
    /// What to do.
    pub action: BeforeActionKind,
    /// Target element, when the action needs one.
    #[serde(default)]
    pub selector: Option<String>,
    /// Text or option value for `type`/`select` actions.
    #[serde(default)]
    pub value: Option<String>,
    /// Delay in milliseconds for `wait` actions.
    #[serde(default)]
    pub delay: Option<u64>,
}

/// Crop rectangle applied to a captured image, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Browser viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Pixel density multiplier; higher values yield sharper captures.
    #[serde(default = "default_scale_factor")]
    pub device_scale_factor: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: default_scale_factor(),
        }
    }
}

fn default_scale_factor() -> u32 {
    3
}

/// Identity of the plugin under test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginSection {
    /// Human-readable plugin name used in reporting.
    pub name: String,
    /// Composer package identifier, e.g. `vendor/package`.
    pub package: String,
}

/// Starter kit used to scaffold the ephemeral project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KitSection {
    /// Package handed to `composer create-project`.
    pub package: String,
}

impl Default for KitSection {
    fn default() -> Self {
        Self {
            package: defaults::STARTER_KIT.to_owned(),
        }
    }
}

/// Plugin class registered into a named panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginRegistration {
    /// Fully-qualified plugin class.
    pub class: String,
    /// Panel identifier the class registers into.
    #[serde(default = "default_panel")]
    pub panel: String,
}

fn default_panel() -> String {
    "admin".to_owned()
}

/// Installation steps run after the plugin package is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InstallSection {
    /// Additional composer packages required alongside the plugin.
    pub extra_packages: Vec<String>,
    /// Plugin classes to splice into panel providers.
    pub plugins: Vec<PluginRegistration>,
    /// `vendor:publish` tags to run.
    pub publish: Vec<String>,
    /// Artisan commands run after installation, in order.
    pub post_install_commands: Vec<String>,
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            extra_packages: Vec::new(),
            plugins: Vec::new(),
            publish: Vec::new(),
            post_install_commands: vec!["migrate".to_owned()],
        }
    }
}

/// Synthetic login user created before capturing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserSection {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            email: "admin@example.com".to_owned(),
            password: "password".to_owned(),
            name: "Admin User".to_owned(),
        }
    }
}

/// Explicit seed entry for one model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelSeed {
    /// Fully-qualified model class, e.g. `App\Models\Product`.
    pub model: String,
    /// Rows to create.
    #[serde(default = "default_seed_count")]
    pub count: u32,
    /// Literal attribute overrides applied to every created row.
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

fn default_seed_count() -> u32 {
    10
}

/// Seeding strategy for the ephemeral project.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedSection {
    /// Derive seeders from the plugin's detected resources.
    pub auto_detect: bool,
    /// Credentials for the synthetic login user.
    pub user: UserSection,
    /// Explicit per-model entries; these win over auto-detected ones.
    pub models: Vec<ModelSeed>,
}

impl Default for SeedSection {
    fn default() -> Self {
        Self {
            auto_detect: true,
            user: UserSection::default(),
            models: Vec::new(),
        }
    }
}

/// One screenshot to capture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScreenshotSpec {
    /// Artifact name; becomes `{name}.{format}` on disk.
    pub name: String,
    /// Path or absolute URL to open, relative to the server base URL.
    pub url: String,
    /// Root CSS selector scoping the capture.
    #[serde(default = "default_selector")]
    pub selector: String,
    /// Actions executed before the shot, in order.
    #[serde(default)]
    pub before: Vec<BeforeAction>,
    /// Optional crop applied after capture.
    #[serde(default)]
    pub crop: Option<CropRect>,
    /// Optional viewport override for this shot only.
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

fn default_selector() -> String {
    "body".to_owned()
}

/// Where and how artifacts are written into the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory inside the plugin receiving artifacts.
    pub directory: String,
    /// Themes to capture each screenshot under.
    pub themes: Vec<Theme>,
    /// Image format for all artifacts.
    pub format: ImageFormat,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: "screenshots".to_owned(),
            themes: vec![Theme::Light, Theme::Dark],
            format: ImageFormat::Png,
        }
    }
}

/// README section templates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReadmeTemplate {
    /// One row per screenshot, one column per theme.
    #[default]
    Table,
    /// A heading and image per (screenshot, theme) pair.
    Gallery,
}

/// README update behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadmeSection {
    /// Rewrite the README section after capturing.
    pub update: bool,
    /// Marker delimiting the managed section; must appear twice.
    pub section_marker: String,
    /// Layout of the generated section.
    pub template: ReadmeTemplate,
}

impl Default for ReadmeSection {
    fn default() -> Self {
        Self {
            update: false,
            section_marker: "<!-- SCREENSHOTS -->".to_owned(),
            template: ReadmeTemplate::Table,
        }
    }
}

/// The complete per-plugin manifest.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    /// Plugin identity; the only mandatory section.
    pub plugin: PluginSection,
    /// Starter kit selection.
    #[serde(default)]
    pub kit: KitSection,
    /// Installation steps.
    #[serde(default)]
    pub install: InstallSection,
    /// Seeding strategy.
    #[serde(default)]
    pub seed: SeedSection,
    /// Screenshots to capture.
    #[serde(default)]
    pub screenshots: Vec<ScreenshotSpec>,
    /// Output settings.
    #[serde(default)]
    pub output: OutputSection,
    /// README update settings.
    #[serde(default)]
    pub readme: ReadmeSection,
}

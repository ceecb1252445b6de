//! The JSON job description handed to the capture worker.

use camino::Utf8Path;
use panelshot_config::{
    BeforeAction, Config, CropRect, Manifest, ScreenshotSpec, Theme, Viewport,
};
use serde::Serialize;
use url::Url;

use crate::error::CaptureError;

/// Login credentials for the synthetic user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobUser {
    pub email: String,
    pub password: String,
}

/// One pre-capture action, with unset fields omitted from the wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobAction {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

impl From<&BeforeAction> for JobAction {
    fn from(action: &BeforeAction) -> Self {
        Self {
            action: action.action.to_string(),
            selector: action.selector.clone(),
            value: action.value.clone(),
            delay: action.delay,
        }
    }
}

/// One screenshot entry of the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobScreenshot {
    pub name: String,
    pub url: String,
    pub selector: String,
    pub before: Vec<JobAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<JobViewport>,
}

/// Viewport in the worker's camelCase wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobViewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: u32,
}

impl From<Viewport> for JobViewport {
    fn from(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            device_scale_factor: viewport.device_scale_factor,
        }
    }
}

/// The complete job document (core→worker contract).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureJob {
    pub base_url: String,
    pub user: JobUser,
    pub screenshots: Vec<JobScreenshot>,
    pub themes: Vec<Theme>,
    pub viewport: JobViewport,
    pub format: String,
    pub output_dir: String,
    pub navigation_timeout: u64,
}

/// Assembles the job from the validated manifest and runtime config.
///
/// Relative screenshot URLs are resolved against `base_url`; absolute ones
/// pass through. The output directory is the absolute `screenshots` tree
/// inside the ephemeral project.
pub fn build_job(
    manifest: &Manifest,
    config: &Config,
    project_dir: &Utf8Path,
    base_url: &Url,
) -> Result<CaptureJob, CaptureError> {
    let screenshots = manifest
        .screenshots
        .iter()
        .map(|spec| job_screenshot(spec, base_url))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CaptureJob {
        base_url: base_url.to_string(),
        user: JobUser {
            email: manifest.seed.user.email.clone(),
            password: manifest.seed.user.password.clone(),
        },
        screenshots,
        themes: manifest.output.themes.clone(),
        viewport: Viewport::default().into(),
        format: manifest.output.format.to_string(),
        output_dir: project_dir.join("screenshots").to_string(),
        navigation_timeout: config.navigation_timeout_ms,
    })
}

fn job_screenshot(spec: &ScreenshotSpec, base_url: &Url) -> Result<JobScreenshot, CaptureError> {
    let url = if spec.url.starts_with("http://") || spec.url.starts_with("https://") {
        spec.url.clone()
    } else {
        base_url
            .join(spec.url.trim_start_matches('/'))
            .map_err(|source| CaptureError::ScreenshotUrl {
                value: spec.url.clone(),
                source,
            })?
            .to_string()
    };
    Ok(JobScreenshot {
        name: spec.name.clone(),
        url,
        selector: spec.selector.clone(),
        before: spec.before.iter().map(JobAction::from).collect(),
        crop: spec.crop,
        viewport: spec.viewport.map(JobViewport::from),
    })
}

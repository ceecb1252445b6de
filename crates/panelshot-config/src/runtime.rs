//! Runtime configuration for the panelshot binary.
//!
//! Values are layered by `ortho_config`: built-in defaults first, then
//! `PANELSHOT_*` environment variables, then command-line flags. The derived
//! overlay struct keeps every field optional so only explicitly provided
//! values override the defaults applied here.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults;
use crate::logging::LogFormat;

/// Whether Herd-style external serving is used for the ephemeral project.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HerdMode {
    /// Serve through Herd when its watched directory exists.
    #[default]
    Auto,
    /// Always serve through Herd; hosting fails when it is unavailable.
    On,
    /// Never use Herd; always spawn the fallback server.
    Off,
}

/// Fallback dev-server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host the server binds to.
    pub host: String,
    /// Port the server binds to.
    pub port: u16,
    /// Seconds to wait for the server to accept connections.
    pub startup_timeout_secs: u64,
}

impl ServerConfig {
    /// Startup timeout as a [`Duration`].
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_owned(),
            port: defaults::SERVER_PORT,
            startup_timeout_secs: defaults::SERVER_TIMEOUT_SECS,
        }
    }
}

/// Herd-style external hosting settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HerdConfig {
    /// Detection mode.
    pub mode: HerdMode,
    /// Watched directory; when unset a platform default is probed.
    pub directory: Option<Utf8PathBuf>,
    /// Top-level domain watched directories are served under.
    pub tld: Option<String>,
}

impl HerdConfig {
    /// TLD to use, falling back to the built-in default.
    #[must_use]
    pub fn tld_or_default(&self) -> &str {
        self.tld.as_deref().unwrap_or(defaults::HERD_TLD)
    }
}

/// Resolved runtime configuration consumed by every subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PHP interpreter binary.
    pub php_binary: String,
    /// Composer binary.
    pub composer_binary: String,
    /// Node.js binary for the capture worker.
    pub node_binary: String,
    /// pnpm binary for frontend and worker dependencies.
    pub pnpm_binary: String,
    /// Location of the ephemeral project.
    pub temp_dir: Utf8PathBuf,
    /// Fallback dev-server settings.
    pub server: ServerConfig,
    /// Herd-style hosting settings.
    pub herd: HerdConfig,
    /// Milliseconds the capture worker waits for page navigation.
    pub navigation_timeout_ms: u64,
    /// Log filter expression (tracing `EnvFilter` syntax).
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            php_binary: defaults::PHP_BINARY.to_owned(),
            composer_binary: defaults::COMPOSER_BINARY.to_owned(),
            node_binary: defaults::NODE_BINARY.to_owned(),
            pnpm_binary: defaults::PNPM_BINARY.to_owned(),
            temp_dir: defaults::temp_dir(),
            server: ServerConfig::default(),
            herd: HerdConfig::default(),
            navigation_timeout_ms: defaults::NAVIGATION_TIMEOUT_MS,
            log_filter: defaults::default_log_filter_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and arguments.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        ConfigOverlay::load().map(Self::from_overlay)
    }

    /// Loads configuration from the environment and the given arguments.
    ///
    /// The first element is treated as the program name, matching clap's
    /// `parse_from` convention.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ConfigOverlay::load_from_iter(args).map(Self::from_overlay)
    }

    fn from_overlay(overlay: ConfigOverlay) -> Self {
        let mut config = Self::default();
        if let Some(value) = overlay.php_binary {
            config.php_binary = value;
        }
        if let Some(value) = overlay.composer_binary {
            config.composer_binary = value;
        }
        if let Some(value) = overlay.node_binary {
            config.node_binary = value;
        }
        if let Some(value) = overlay.pnpm_binary {
            config.pnpm_binary = value;
        }
        if let Some(value) = overlay.temp_dir {
            config.temp_dir = Utf8PathBuf::from(value);
        }
        if let Some(value) = overlay.server_host {
            config.server.host = value;
        }
        if let Some(value) = overlay.server_port {
            config.server.port = value;
        }
        if let Some(value) = overlay.server_timeout {
            config.server.startup_timeout_secs = value;
        }
        if let Some(value) = overlay.herd_enabled {
            config.herd.mode = value;
        }
        if let Some(value) = overlay.herd_dir {
            config.herd.directory = Some(Utf8PathBuf::from(value));
        }
        if let Some(value) = overlay.herd_tld {
            config.herd.tld = Some(value);
        }
        if let Some(value) = overlay.navigation_timeout {
            config.navigation_timeout_ms = value;
        }
        if let Some(value) = overlay.log_filter {
            config.log_filter = value;
        }
        if let Some(value) = overlay.log_format {
            config.log_format = value;
        }
        config
    }
}

/// Optional overlay populated by `ortho_config` before defaults apply.
#[derive(Debug, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PANELSHOT")]
struct ConfigOverlay {
    php_binary: Option<String>,
    composer_binary: Option<String>,
    node_binary: Option<String>,
    pnpm_binary: Option<String>,
    temp_dir: Option<String>,
    server_host: Option<String>,
    server_port: Option<u16>,
    server_timeout: Option<u64>,
    herd_enabled: Option<HerdMode>,
    herd_dir: Option<String>,
    herd_tld: Option<String>,
    navigation_timeout: Option<u64>,
    log_filter: Option<String>,
    log_format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_subsystem() {
        let config = Config::default();
        assert_eq!(config.php_binary, "php");
        assert_eq!(config.composer_binary, "composer");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.server.startup_timeout(), Duration::from_secs(30));
        assert_eq!(config.herd.mode, HerdMode::Auto);
        assert_eq!(config.herd.tld_or_default(), "test");
        assert_eq!(config.navigation_timeout_ms, 30_000);
        assert!(config.temp_dir.as_str().ends_with("panelshot-temp"));
    }

    #[test]
    fn overlay_values_override_defaults() {
        let overlay = ConfigOverlay {
            php_binary: Some("php8.4".to_owned()),
            server_port: Some(9000),
            herd_enabled: Some(HerdMode::Off),
            log_format: Some(LogFormat::Json),
            ..ConfigOverlay::default()
        };
        let config = Config::from_overlay(overlay);
        assert_eq!(config.php_binary, "php8.4");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.herd.mode, HerdMode::Off);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.composer_binary, "composer");
    }

    #[test]
    fn herd_mode_parses_case_insensitively() {
        assert_eq!("AUTO".parse::<HerdMode>(), Ok(HerdMode::Auto));
        assert_eq!("on".parse::<HerdMode>(), Ok(HerdMode::On));
        assert_eq!("Off".parse::<HerdMode>(), Ok(HerdMode::Off));
        assert!("maybe".parse::<HerdMode>().is_err());
    }
}

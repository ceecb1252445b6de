//! Built-in defaults shared by the runtime configuration and the manifest.

use std::env;

use camino::Utf8PathBuf;

/// Default PHP interpreter binary.
pub const PHP_BINARY: &str = "php";

/// Default composer binary.
pub const COMPOSER_BINARY: &str = "composer";

/// Default Node.js binary used to run the capture worker.
pub const NODE_BINARY: &str = "node";

/// Default pnpm binary used for frontend and worker dependencies.
pub const PNPM_BINARY: &str = "pnpm";

/// Host the fallback dev server binds to.
pub const SERVER_HOST: &str = "127.0.0.1";

/// Port the fallback dev server binds to.
pub const SERVER_PORT: u16 = 8787;

/// Seconds to wait for the dev server to accept connections.
pub const SERVER_TIMEOUT_SECS: u64 = 30;

/// Milliseconds the capture worker waits for page navigation.
pub const NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Top-level domain Herd serves watched directories under.
pub const HERD_TLD: &str = "test";

/// Starter kit installed by `composer create-project`.
pub const STARTER_KIT: &str = "filakitphp/basev5";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Location of the ephemeral project when none is configured.
pub fn temp_dir() -> Utf8PathBuf {
    let mut base = Utf8PathBuf::from_path_buf(env::temp_dir())
        .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"));
    base.push("panelshot-temp");
    base
}

//! Hosting-mode resolution and the dev-server state machine.
//!
//! Two modes serve the ephemeral project. When Herd-style external serving
//! applies, the project is reachable at `http://{dir_name}.{tld}` without
//! any process of ours; otherwise a `php artisan serve` child is spawned on
//! the configured host:port. Both end up as a [`Hosting`] value with a
//! uniform base URL and release operation; the spawned variant terminates
//! its child on release and force-frees the port as a fallback for orphaned
//! grandchildren. Release runs exactly once per run, on every exit path,
//! via the drop implementation.

use std::fs;
use std::process::Child;
use std::thread;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use panelshot_config::{Config, HerdMode};
use panelshot_exec::{Toolchain, free_port, probe, spawn_background};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ProjectError;

/// Log target for hosting operations.
const HOSTING_TARGET: &str = "panelshot_project::hosting";

/// Interval between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Per-probe TCP connect timeout.
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Grace period before checking that a spawned server is still alive.
const SPAWN_GRACE: Duration = Duration::from_millis(500);

/// Lines of server log surfaced in startup errors.
const LOG_TAIL_LINES: usize = 20;

/// How the ephemeral project is served for one run.
#[derive(Debug)]
pub enum Hosting {
    /// A `php artisan serve` child owned by this run.
    Spawned(SpawnedServer),
    /// An always-on externally served site; nothing to release.
    External {
        /// Derived base URL of the served directory.
        url: Url,
    },
}

impl Hosting {
    /// Base URL the capture job targets.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        match self {
            Self::Spawned(server) => &server.url,
            Self::External { url } => url,
        }
    }

    /// Releases whatever the mode holds. Idempotent; also runs on drop.
    pub fn release(&mut self) {
        if let Self::Spawned(server) = self {
            server.release();
        }
    }
}

/// A spawned dev-server process plus the facts needed to tear it down.
#[derive(Debug)]
pub struct SpawnedServer {
    child: Option<Child>,
    url: Url,
    port: u16,
    stdout_log: Utf8PathBuf,
    stderr_log: Utf8PathBuf,
}

impl SpawnedServer {
    /// Terminates the child if still running and force-frees the port.
    ///
    /// Termination errors are swallowed; the port sweep catches orphaned
    /// children the kill missed.
    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(error) = child.kill() {
                debug!(target: HOSTING_TARGET, %error, "server already gone");
            }
            let _ = child.wait();
            free_port(self.port);
            info!(target: HOSTING_TARGET, port = self.port, "server stopped");
        }
    }

    fn tails(&self) -> (String, String) {
        (log_tail(&self.stdout_log), log_tail(&self.stderr_log))
    }
}

impl Drop for SpawnedServer {
    fn drop(&mut self) {
        self.release();
    }
}

/// Resolves the hosting mode and makes the project reachable.
///
/// Herd-style serving applies when the mode allows it, the watched
/// directory exists, and the project lives inside it; the manager then only
/// polls the derived host. Every other case spawns the fallback server.
pub fn ensure_server(
    config: &Config,
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
) -> Result<Hosting, ProjectError> {
    if let Some(url) = external_site(config, project_dir)? {
        let host = url.host_str().unwrap_or_default().to_owned();
        let port = url.port_or_known_default().unwrap_or(80);
        info!(target: HOSTING_TARGET, %url, "project is externally served; waiting for it");
        wait_until_reachable(&host, port, config.server.startup_timeout()).map_err(|_| {
            ProjectError::ServerStart {
                reason: format!("externally served site '{url}' never became reachable"),
                stdout_tail: String::new(),
                stderr_tail: String::new(),
            }
        })?;
        return Ok(Hosting::External { url });
    }
    spawn_server(config, toolchain, project_dir)
}

/// Derived external URL, when Herd-style serving applies to this project.
fn external_site(config: &Config, project_dir: &Utf8Path) -> Result<Option<Url>, ProjectError> {
    if config.herd.mode == HerdMode::Off {
        return Ok(None);
    }
    let watched = config
        .herd
        .directory
        .clone()
        .or_else(default_watched_directory);
    let Some(watched) = watched.filter(|dir| dir.is_dir()) else {
        if config.herd.mode == HerdMode::On {
            return Err(ProjectError::ServerStart {
                reason: "Herd serving is forced on but no watched directory exists".to_owned(),
                stdout_tail: String::new(),
                stderr_tail: String::new(),
            });
        }
        return Ok(None);
    };
    if !project_dir.starts_with(&watched) {
        if config.herd.mode == HerdMode::On {
            return Err(ProjectError::ServerStart {
                reason: format!(
                    "Herd serving is forced on but '{project_dir}' is outside '{watched}'"
                ),
                stdout_tail: String::new(),
                stderr_tail: String::new(),
            });
        }
        return Ok(None);
    }

    let site = project_dir.file_name().unwrap_or("panelshot");
    let value = format!("http://{site}.{}/", config.herd.tld_or_default());
    let url = Url::parse(&value).map_err(|source| ProjectError::BaseUrl { value, source })?;
    Ok(Some(url))
}

/// Platform-conventional Herd watched directory.
fn default_watched_directory() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir()?;
    Utf8PathBuf::from_path_buf(home).ok().map(|dir| dir.join("Herd"))
}

/// Spawns the fallback server and waits until it accepts connections.
fn spawn_server(
    config: &Config,
    toolchain: &Toolchain,
    project_dir: &Utf8Path,
) -> Result<Hosting, ProjectError> {
    let host = config.server.host.clone();
    let port = config.server.port;

    // A leftover listener from an aborted run would make the spawn fail or,
    // worse, serve a stale project.
    let freed = free_port(port);
    if freed > 0 {
        warn!(target: HOSTING_TARGET, port, freed, "freed stale listeners before starting");
    }

    let log_dir = project_dir.join("storage/logs");
    fs::create_dir_all(&log_dir).map_err(|source| ProjectError::Io {
        action: "create",
        path: log_dir.clone(),
        source,
    })?;
    let stdout_log = log_dir.join("panelshot-server.out.log");
    let stderr_log = log_dir.join("panelshot-server.err.log");

    let command = toolchain.artisan(
        project_dir,
        ["serve", "--host", &host, "--port", &port.to_string()],
    );
    info!(target: HOSTING_TARGET, host, port, "starting dev server");
    let child = spawn_background(&command, &stdout_log, &stderr_log)?;

    let value = format!("http://{host}:{port}/");
    let url = Url::parse(&value).map_err(|source| ProjectError::BaseUrl { value, source })?;
    let mut server = SpawnedServer {
        child: Some(child),
        url,
        port,
        stdout_log,
        stderr_log,
    };

    // Fail fast when the child dies straight away (bad artisan path, port
    // grabbed between the sweep and the spawn).
    thread::sleep(SPAWN_GRACE);
    if let Some(child) = server.child.as_mut() {
        if let Ok(Some(status)) = child.try_wait() {
            let (stdout_tail, stderr_tail) = server.tails();
            return Err(ProjectError::ServerStart {
                reason: format!("server exited immediately with {status}"),
                stdout_tail,
                stderr_tail,
            });
        }
    }

    if wait_until_reachable(&host, port, config.server.startup_timeout()).is_err() {
        let (stdout_tail, stderr_tail) = server.tails();
        return Err(ProjectError::ServerStart {
            reason: format!(
                "server did not accept connections on {host}:{port} within {}s",
                config.server.startup_timeout_secs
            ),
            stdout_tail,
            stderr_tail,
        });
    }

    info!(target: HOSTING_TARGET, url = %server.url, "dev server ready");
    Ok(Hosting::Spawned(server))
}

/// Polls `host:port` until it accepts a TCP connection or `timeout`
/// elapses.
pub fn wait_until_reachable(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(), ProjectError> {
    let deadline = Instant::now() + timeout;
    loop {
        if probe(host, port, PROBE_CONNECT_TIMEOUT) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ProjectError::ServerStart {
                reason: format!("{host}:{port} not reachable within {}s", timeout.as_secs()),
                stdout_tail: String::new(),
                stderr_tail: String::new(),
            });
        }
        thread::sleep(READY_POLL_INTERVAL);
    }
}

/// Last lines of a server log, or a placeholder when unreadable.
fn log_tail(path: &Utf8Path) -> String {
    let Ok(text) = fs::read_to_string(path) else {
        return "<log unavailable>".to_owned();
    };
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    lines.get(start..).unwrap_or_default().join("\n")
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn readiness_wait_succeeds_once_the_port_accepts() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        wait_until_reachable("127.0.0.1", port, Duration::from_secs(5))
            .expect("bound port should be reachable");
    }

    #[test]
    fn readiness_wait_observes_late_listeners() {
        let probe_port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
            listener.local_addr().expect("local addr").port()
        };
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_secs(2));
            TcpListener::bind(("127.0.0.1", probe_port)).ok()
        });

        let started = Instant::now();
        let result = wait_until_reachable("127.0.0.1", probe_port, Duration::from_secs(5));
        let listener = handle.join().expect("listener thread");

        if listener.is_some() {
            result.expect("late listener should be observed");
            assert!(started.elapsed() >= Duration::from_secs(2));
        }
    }

    #[test]
    fn readiness_wait_times_out_with_a_server_start_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
            listener.local_addr().expect("local addr").port()
        };
        let error = wait_until_reachable("127.0.0.1", port, Duration::from_secs(1))
            .expect_err("closed port must time out");
        assert!(matches!(error, ProjectError::ServerStart { .. }));
    }

    #[test]
    fn herd_off_never_serves_externally() {
        let config = Config::default();
        let mut off = config.clone();
        off.herd.mode = HerdMode::Off;
        let result = external_site(&off, Utf8Path::new("/tmp/any"))
            .expect("off mode should not error");
        assert!(result.is_none());
    }

    #[test]
    fn herd_auto_requires_the_project_inside_the_watched_directory() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let watched = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");

        let mut config = Config::default();
        config.herd.mode = HerdMode::Auto;
        config.herd.directory = Some(watched.clone());

        let inside = watched.join("shop-demo");
        let url = external_site(&config, &inside)
            .expect("auto mode should not error")
            .expect("project inside watched dir should be served");
        assert_eq!(url.as_str(), "http://shop-demo.test/");

        let outside = external_site(&config, Utf8Path::new("/somewhere/else"))
            .expect("auto mode should not error");
        assert!(outside.is_none());
    }

    #[test]
    fn herd_forced_on_fails_without_a_watched_directory() {
        let mut config = Config::default();
        config.herd.mode = HerdMode::On;
        config.herd.directory = Some(Utf8PathBuf::from("/panelshot-test/does-not-exist"));

        let error = external_site(&config, Utf8Path::new("/tmp/project"))
            .expect_err("forced herd without directory must fail");
        assert!(matches!(error, ProjectError::ServerStart { .. }));
    }

    #[test]
    fn log_tails_keep_only_the_last_lines() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");
        let log = dir.join("server.log");
        let text: String = (0..40).map(|index| format!("line {index}\n")).collect();
        fs::write(&log, text).expect("write log");

        let tail = log_tail(&log);
        assert!(tail.starts_with("line 20"));
        assert!(tail.ends_with("line 39"));
    }

    #[test]
    fn custom_herd_tld_feeds_the_derived_url() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let watched = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir should be utf-8");

        let mut config = Config::default();
        config.herd.directory = Some(watched.clone());
        config.herd.tld = Some("localdev".to_owned());

        let url = external_site(&config, &watched.join("blog"))
            .expect("auto mode should not error")
            .expect("project inside watched dir should be served");
        assert_eq!(url.as_str(), "http://blog.localdev/");
    }
}

//! Listening-port helpers: probe, enumerate owners, force-free.
//!
//! Port freeing is deliberately best-effort. A stale dev server from an
//! aborted run is the expected target; when `lsof` is unavailable or the
//! processes are already gone there is nothing to do.

use std::net::{TcpStream, ToSocketAddrs};
use std::process::Command;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::{debug, warn};

/// Log target for port operations.
const PORT_TARGET: &str = "panelshot_exec::port";

/// Returns the PIDs currently listening on `port`, or empty when the lookup
/// tool is unavailable.
#[must_use]
pub fn listening_pids(port: u16) -> Vec<u32> {
    let output = Command::new("lsof")
        .args(["-t", &format!("-iTCP:{port}"), "-sTCP:LISTEN"])
        .output();
    let Ok(output) = output else {
        debug!(target: PORT_TARGET, port, "lsof unavailable; skipping pid lookup");
        return Vec::new();
    };
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

/// Kills every process listening on `port`, returning how many were
/// signalled. Processes that vanish mid-way are not an error.
pub fn free_port(port: u16) -> usize {
    let mut freed = 0;
    for pid in listening_pids(port) {
        match kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) => {
                debug!(target: PORT_TARGET, port, pid, "killed stale listener");
                freed += 1;
            }
            Err(Errno::ESRCH) => {}
            Err(errno) => {
                warn!(target: PORT_TARGET, port, pid, %errno, "failed to kill listener");
            }
        }
    }
    freed
}

/// Attempts one TCP connection to `host:port` within `timeout`.
#[must_use]
pub fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    let Ok(addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    for addr in addrs {
        if TcpStream::connect_timeout(&addr, timeout).is_ok() {
            return true;
        }
    }
    false
}

//! Blocking command execution with timeouts and background spawning.

use std::fs::File;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::errors::ExecError;

/// Log target for runner operations.
const RUNNER_TARGET: &str = "panelshot_exec::runner";

/// Timeout applied when a command line does not set one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Interval between child status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One external command: program, arguments, working directory, timeout.
#[derive(Debug, Clone)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    cwd: Option<Utf8PathBuf>,
    timeout: Duration,
}

impl CommandLine {
    /// Starts a command line for `program` with the default timeout.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets the timeout for blocking runs.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable rendering used in logs and error messages.
    #[must_use]
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Captured outcome of a blocking run.
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Standard output and standard error concatenated, stdout first.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Runs a command to completion, killing it when its timeout elapses.
pub fn run(command_line: &CommandLine) -> Result<CommandOutput, ExecError> {
    debug!(
        target: RUNNER_TARGET,
        command = %command_line.display(),
        cwd = ?command_line.cwd,
        "running command"
    );

    let mut command = Command::new(&command_line.program);
    command
        .args(&command_line.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &command_line.cwd {
        command.current_dir(dir);
    }

    let mut child = command
        .spawn()
        .map_err(|source| spawn_error(command_line, source))?;

    let stdout_reader = child.stdout.take().map(drain_pipe);
    let stderr_reader = child.stderr.take().map(drain_pipe);

    let deadline = Instant::now() + command_line.timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!(
                        target: RUNNER_TARGET,
                        command = %command_line.display(),
                        timeout_secs = command_line.timeout.as_secs(),
                        "command timed out; killing"
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecError::Timeout {
                        command: command_line.display(),
                        timeout_secs: command_line.timeout.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExecError::Monitor {
                    command: command_line.display(),
                    source,
                });
            }
        }
    };

    let output = CommandOutput {
        code: status.code(),
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    };

    debug!(
        target: RUNNER_TARGET,
        command = %command_line.display(),
        code = ?output.code,
        "command finished"
    );

    Ok(output)
}

/// Runs a command and fails when it exits non-zero.
pub fn run_ok(command_line: &CommandLine) -> Result<CommandOutput, ExecError> {
    let output = run(command_line)?;
    if output.success() {
        return Ok(output);
    }
    Err(ExecError::CommandFailed {
        command: command_line.display(),
        code: output.code,
        output: output.combined(),
    })
}

/// Spawns a command detached from the caller, redirecting its output to the
/// given log files. The caller owns the returned child.
pub fn spawn_background(
    command_line: &CommandLine,
    stdout_log: &Utf8Path,
    stderr_log: &Utf8Path,
) -> Result<Child, ExecError> {
    let stdout = File::create(stdout_log).map_err(|source| ExecError::RedirectLog {
        path: stdout_log.to_path_buf(),
        source,
    })?;
    let stderr = File::create(stderr_log).map_err(|source| ExecError::RedirectLog {
        path: stderr_log.to_path_buf(),
        source,
    })?;

    let mut command = Command::new(&command_line.program);
    command
        .args(&command_line.args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));
    if let Some(dir) = &command_line.cwd {
        command.current_dir(dir);
    }

    let child = command
        .spawn()
        .map_err(|source| spawn_error(command_line, source))?;

    debug!(
        target: RUNNER_TARGET,
        command = %command_line.display(),
        pid = child.id(),
        "background command spawned"
    );

    Ok(child)
}

fn spawn_error(command_line: &CommandLine, source: std::io::Error) -> ExecError {
    if source.kind() == std::io::ErrorKind::NotFound {
        ExecError::BinaryNotFound {
            command: command_line.program.clone(),
        }
    } else {
        ExecError::Spawn {
            command: command_line.display(),
            source,
        }
    }
}

fn drain_pipe(pipe: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut pipe = pipe;
        let mut buffer = String::new();
        let _ = pipe.read_to_string(&mut buffer);
        buffer
    })
}

fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}

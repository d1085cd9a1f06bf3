// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Git command execution
//!
//! Every invocation runs the configured git binary with the repository root
//! as the *child's* working directory. The working directory of the calling
//! process is never touched, so the directory switch is scoped to the child
//! and released when it exits, on success and failure alike.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::GitError;

/// Default limit for a single git invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Executes git subcommands on behalf of a repository
///
/// The seam exists so the parsing layers can be driven from canned output.
pub trait GitRunner {
    /// Run `git <args>` inside `workdir` and return its stdout verbatim
    ///
    /// Bytes that are not valid UTF-8 (e.g. a latin1 commit message) are
    /// replaced with U+FFFD and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Execution` on a non-zero exit status, and
    /// `GitError::Spawn` / `GitError::Timeout` when the process could not be
    /// started or did not finish in time.
    fn run(&self, workdir: &Path, args: &[String]) -> Result<String, GitError>;
}

/// How to launch git
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Executable to run
    pub git_binary: PathBuf,
    /// Kill the process after this long (`None` waits forever)
    pub timeout: Option<Duration>,
    /// `-c key=value` overrides placed before the subcommand
    pub config_overrides: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            git_binary: PathBuf::from("git"),
            timeout: Some(DEFAULT_TIMEOUT),
            config_overrides: vec![
                "core.quotePath=false".to_string(),
                "log.showSignature=false".to_string(),
            ],
        }
    }
}

impl RunnerConfig {
    /// Run `binary` with no config overrides
    ///
    /// Useful for pointing the runner at a wrapper script.
    #[must_use]
    pub fn bare(binary: impl Into<PathBuf>) -> Self {
        Self {
            git_binary: binary.into(),
            config_overrides: Vec::new(),
            ..Self::default()
        }
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs the system git binary as a child process
#[derive(Debug, Clone, Default)]
pub struct SystemGitRunner {
    config: RunnerConfig,
}

impl SystemGitRunner {
    /// Create a runner with the given configuration
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn command(&self, workdir: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.git_binary);
        cmd.current_dir(workdir);

        // Never block on credential prompts
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        for entry in &self.config.config_overrides {
            cmd.arg("-c").arg(entry);
        }

        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl GitRunner for SystemGitRunner {
    fn run(&self, workdir: &Path, args: &[String]) -> Result<String, GitError> {
        let command = command_line(&self.config.git_binary, args);
        debug!(command = %command, workdir = %workdir.display(), "Running git");

        let mut child = self
            .command(workdir, args)
            .spawn()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_with_deadline(&mut child, self.config.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                // Reader threads are left detached: grandchildren may still hold the pipes
                let _ = child.kill();
                let _ = child.wait();
                let timeout = self.config.timeout.unwrap_or_default();
                warn!(command = %command, timeout_secs = timeout.as_secs(), "Git command timed out");
                return Err(GitError::Timeout { command, timeout });
            }
            Err(source) => {
                let _ = child.kill();
                return Err(GitError::Spawn { command, source });
            }
        };

        let stdout = collect(stdout, &command);
        let stderr = collect(stderr, &command);

        if !status.success() {
            debug!(command = %command, status = ?status.code(), "Git command failed");
            return Err(GitError::Execution {
                command,
                status: status.code(),
                output: stdout + &stderr,
            });
        }

        Ok(stdout)
    }
}

/// Render a command line for logs and error messages
fn command_line(binary: &Path, args: &[String]) -> String {
    let mut line = binary.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn collect(handle: JoinHandle<Vec<u8>>, command: &str) -> String {
    let bytes = handle.join().unwrap_or_default();
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                command = %command,
                valid_up_to = err.utf8_error().valid_up_to(),
                "Git output is not valid UTF-8, replacing invalid bytes"
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

/// Wait for `child`, giving up once `timeout` has elapsed
///
/// Returns `Ok(None)` on timeout; the child is still running in that case.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    // Limits too large to represent as an instant never expire
    let Some(deadline) = Instant::now().checked_add(timeout) else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

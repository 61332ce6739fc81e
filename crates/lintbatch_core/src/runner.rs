//! Subprocess execution with a deadline.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::ExecutorError;
use crate::command::LintCommand;

/// Result of one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    /// Exit code. `None` if the process was ended by a signal.
    pub exit_code: Option<i32>,
    /// Report file the linter was asked to write.
    pub output_path: PathBuf,
    /// Deadline the invocation ran under.
    pub timeout: Duration,
    /// Wall time until exit.
    pub elapsed: Duration,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl InvocationOutcome {
    /// Creates an outcome with no captured streams.
    pub fn new(exit_code: Option<i32>, output_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            exit_code,
            output_path: output_path.into(),
            timeout,
            elapsed: Duration::ZERO,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Returns `true` for exit code 0.
    ///
    /// Linters commonly exit with 1 when they report issues, so `false` here
    /// does not mean the invocation failed.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a built command and waits for it within a deadline.
///
/// A non-zero exit code is returned as an outcome, never as an error.
pub trait ProcessRunner {
    /// Executes `command`, terminating it if it runs longer than `timeout`.
    ///
    /// # Errors
    ///
    /// * `ProcessLaunch` - the program could not be spawned
    /// * `ProcessTimeout` - the deadline passed; the process was killed
    /// * `Io` - waiting on the process failed
    fn run(&self, command: &LintCommand, timeout: Duration)
    -> Result<InvocationOutcome, ExecutorError>;
}

/// [`ProcessRunner`] backed by `std::process`.
///
/// Standard output and error are drained on background threads so a chatty
/// linter cannot block on a full pipe.
#[derive(Debug, Clone, Copy)]
pub struct NativeProcessRunner {
    poll_interval: Duration,
}

impl NativeProcessRunner {
    /// Creates a runner that polls the child every 10 ms.
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Sets how often the child is polled for exit.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}

impl Default for NativeProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for NativeProcessRunner {
    fn run(
        &self,
        command: &LintCommand,
        timeout: Duration,
    ) -> Result<InvocationOutcome, ExecutorError> {
        let mut std_command = command.to_command();
        std_command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let child = std_command.spawn().map_err(|e| {
            ExecutorError::launch(format!(
                "'{}': {}",
                command.program().to_string_lossy(),
                e
            ))
        })?;
        debug!("Spawned pid {} with timeout {:?}", child.id(), timeout);

        let mut child = ChildGuard::new(child);
        let stdout = child.inner.stdout.take().map(drain);
        let stderr = child.inner.stderr.take().map(drain);

        // A deadline too far away to represent means "wait forever".
        let deadline = started.checked_add(timeout);

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            let now = Instant::now();
            match deadline {
                Some(deadline) if now >= deadline => {
                    child.terminate();
                    warn!(
                        "Linter exceeded {} ms and was terminated",
                        timeout.as_millis()
                    );
                    // Readers finish on their own once the pipes close.
                    return Err(ExecutorError::ProcessTimeout {
                        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                Some(deadline) => thread::sleep(self.poll_interval.min(deadline - now)),
                None => thread::sleep(self.poll_interval),
            }
        };

        let elapsed = started.elapsed();
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        debug!("Linter exited with {:?} after {:?}", status.code(), elapsed);

        Ok(InvocationOutcome {
            exit_code: status.code(),
            output_path: command.output_path().to_path_buf(),
            timeout,
            elapsed,
            stdout,
            stderr,
        })
    }
}

/// Kills and reaps the child on drop unless it already exited.
struct ChildGuard {
    inner: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(inner: Child) -> Self {
        Self {
            inner,
            reaped: false,
        }
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.inner.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    fn terminate(&mut self) {
        if let Err(e) = self.inner.kill() {
            debug!("Failed to kill pid {}: {}", self.inner.id(), e);
        }
        if let Err(e) = self.inner.wait() {
            debug!("Failed to reap pid {}: {}", self.inner.id(), e);
        }
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            self.terminate();
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!("Failed to read linter stream: {}", e);
        }
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

//! Executor error types.

use thiserror::Error;

/// Errors that can occur while planning, running, or collecting lint batches.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// A required argument was absent or unusable. Raised before any work starts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The executor configuration is incomplete.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A batch or file list could not be used to build a command.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The linter executable could not be located or spawned.
    #[error("Failed to launch linter: {0}")]
    ProcessLaunch(String),

    /// The linter did not finish within its deadline and was terminated.
    #[error("Linter timed out after {timeout_ms} ms")]
    ProcessTimeout { timeout_ms: u64 },

    /// The linter exited with a failure code and produced no report.
    #[error("Linter exited with {} and produced no report{}", format_exit(*exit_code), format_stderr(stderr))]
    ProcessFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The linter report could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The settings file could not be loaded.
    #[error("Settings error: {0}")]
    Settings(String),

    /// The run was cancelled between batches. `completed` counts the batches
    /// that had finished when the cancellation was observed.
    #[error("Cancelled after {completed} batch(es)")]
    Cancelled { completed: usize },

    /// A single batch failed. Wraps the underlying cause.
    #[error("Batch {} of {total} ({file_count} file(s)) failed: {source}", index + 1)]
    Batch {
        index: usize,
        total: usize,
        file_count: usize,
        #[source]
        source: Box<ExecutorError>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutorError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a process launch error.
    pub fn launch(message: impl Into<String>) -> Self {
        Self::ProcessLaunch(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }

    /// Wraps `self` with the position of the batch that produced it.
    pub fn in_batch(self, index: usize, total: usize, file_count: usize) -> Self {
        Self::Batch {
            index,
            total,
            file_count,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping any batch context.
    pub fn root_cause(&self) -> &ExecutorError {
        match self {
            Self::Batch { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn format_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

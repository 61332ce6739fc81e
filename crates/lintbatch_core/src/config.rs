//! Executor configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ExecutorError;

/// Conservative upper bound for a rendered command line, in bytes.
///
/// Below the Windows `cmd.exe` limit (8191) and far below typical Unix `ARG_MAX`.
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 4096;

/// Launcher used to run script-based linters such as `eslint.js`.
pub const DEFAULT_LAUNCHER: &str = "node";

/// Report format requested from the linter.
pub const DEFAULT_OUTPUT_FORMAT: &str = "json";

/// Default per-file timeout budget in milliseconds.
pub const DEFAULT_TIMEOUT_MS_PER_FILE: u64 = 60_000;

/// Length reserved for the output file path when planning batches.
///
/// The real path is only known once a temp file is requested, after planning.
pub const OUTPUT_PATH_RESERVE: usize = 260;

/// Configuration for one analysis run.
///
/// Built once by the caller and only read by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Path to the linter entry point (e.g. `node_modules/eslint/bin/eslint.js`).
    pub linter_path: PathBuf,

    /// Linter configuration file passed with `--config`.
    pub config_file: PathBuf,

    /// Additional rules directory. `None` or empty omits `--rules-dir`.
    pub rules_dir: Option<PathBuf>,

    /// Timeout budget per file, in milliseconds.
    pub timeout_ms_per_file: u64,

    /// Host runtime launcher placed before the linter path. `None` or empty runs the linter directly.
    pub launcher: Option<String>,

    /// Value of the `-f` flag.
    pub output_format: String,

    /// Maximum rendered command length used by the planner.
    pub max_command_length: usize,

    /// Number of batches that may run at once. `1` keeps execution sequential.
    pub jobs: usize,
}

impl ExecutorConfig {
    /// Creates a configuration with defaults for everything but the two required paths.
    pub fn new(linter_path: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        Self {
            linter_path: linter_path.into(),
            config_file: config_file.into(),
            ..Self::default()
        }
    }

    /// Sets the rules directory.
    pub fn with_rules_dir(mut self, rules_dir: impl Into<PathBuf>) -> Self {
        self.rules_dir = Some(rules_dir.into());
        self
    }

    /// Sets the per-file timeout budget.
    pub fn with_timeout_ms_per_file(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms_per_file = timeout_ms;
        self
    }

    /// Sets the launcher. An empty string disables it.
    pub fn with_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    /// Runs the linter without a launcher.
    pub fn without_launcher(mut self) -> Self {
        self.launcher = None;
        self
    }

    /// Sets the maximum rendered command length.
    pub fn with_max_command_length(mut self, max: usize) -> Self {
        self.max_command_length = max;
        self
    }

    /// Sets the number of concurrent batches.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Returns the rules directory if it should be passed to the linter.
    pub fn effective_rules_dir(&self) -> Option<&Path> {
        self.rules_dir
            .as_deref()
            .filter(|dir| !is_blank(dir.as_os_str()))
    }

    /// Returns the launcher if one should be used.
    pub fn effective_launcher(&self) -> Option<&str> {
        self.launcher
            .as_deref()
            .map(str::trim)
            .filter(|launcher| !launcher.is_empty())
    }

    /// Returns the deadline for a batch of `file_count` files.
    pub fn timeout_for(&self, file_count: usize) -> Duration {
        Duration::from_millis(self.timeout_ms_for(file_count))
    }

    /// Returns the deadline for a batch of `file_count` files, in milliseconds.
    pub fn timeout_ms_for(&self, file_count: usize) -> u64 {
        self.timeout_ms_per_file
            .saturating_mul(u64::try_from(file_count).unwrap_or(u64::MAX))
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if is_blank(self.linter_path.as_os_str()) {
            return Err(ExecutorError::invalid_configuration(
                "linter path must not be blank",
            ));
        }
        if is_blank(self.config_file.as_os_str()) {
            return Err(ExecutorError::invalid_configuration(
                "config file must not be blank",
            ));
        }
        if self.timeout_ms_per_file == 0 {
            return Err(ExecutorError::invalid_configuration(
                "timeout per file must be positive",
            ));
        }
        if self.max_command_length == 0 {
            return Err(ExecutorError::invalid_configuration(
                "maximum command length must be positive",
            ));
        }
        if self.output_format.trim().is_empty() {
            return Err(ExecutorError::invalid_configuration(
                "output format must not be blank",
            ));
        }
        Ok(())
    }
}

impl Default for ExecutorConfig {
    /// An unpopulated configuration. It does not pass [`ExecutorConfig::validate`].
    fn default() -> Self {
        Self {
            linter_path: PathBuf::new(),
            config_file: PathBuf::new(),
            rules_dir: None,
            timeout_ms_per_file: DEFAULT_TIMEOUT_MS_PER_FILE,
            launcher: Some(DEFAULT_LAUNCHER.to_string()),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            jobs: 1,
        }
    }
}

fn is_blank(value: &std::ffi::OsStr) -> bool {
    value.to_string_lossy().trim().is_empty()
}

//! # lintbatch_core
//!
//! Core engine for running an external linter over many files.
//!
//! This crate provides:
//! - Command-line construction for ESLint-style linters
//! - Batch planning under a command-length limit
//! - Process execution with per-batch timeouts
//! - Report parsing and issue aggregation
//! - Settings file loading
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintbatch_core::{BatchExecutor, ExecutorConfig};
//!
//! let config = ExecutorConfig::new("node_modules/eslint/bin/eslint.js", ".eslintrc.json")
//!     .with_rules_dir("eslint-rules");
//! let executor = BatchExecutor::new();
//!
//! let result = executor.execute(&config, &files)?;
//! for issue in result.issues() {
//!     println!("{}:{}: {}", issue.path.display(), issue.line, issue.message);
//! }
//! ```

mod command;
mod config;
mod error;
mod executor;
mod issue;
mod parser;
mod planner;
pub mod runner;
mod settings;
pub mod temp;

pub use command::{
    CONFIG_FLAG, CommandBuilder, FORMAT_FLAG, LintCommand, OUTPUT_FILE_FLAG, RULES_DIR_FLAG,
    rendered_prefix_len,
};
pub use config::{
    DEFAULT_LAUNCHER, DEFAULT_MAX_COMMAND_LENGTH, DEFAULT_OUTPUT_FORMAT,
    DEFAULT_TIMEOUT_MS_PER_FILE, ExecutorConfig, OUTPUT_PATH_RESERVE,
};
pub use error::ExecutorError;
pub use executor::{BatchExecutor, CancellationToken, ExecutionResult};
pub use issue::{Issue, Severity};
pub use parser::{EslintJsonParser, ReportParser};
pub use planner::{BatchPlanner, FileBatch};
pub use runner::{InvocationOutcome, NativeProcessRunner, ProcessRunner};
pub use settings::LintSettings;
pub use temp::{OutputFile, SystemTempFiles, TempFileProvider};

#[cfg(test)]
pub mod test_utils;

//! Subcommand implementations

mod plan;
mod run;

use std::path::{Path, PathBuf};

use lintbatch_core::{ExecutorConfig, ExecutorError, LintSettings};
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::cli::{Cli, Overrides};

pub use plan::run_plan;
pub use run::run_lint;

/// Loads the settings named on the command line, or the one found in the working directory.
pub fn load_settings(cli: &Cli) -> Result<LintSettings> {
    if let Some(ref path) = cli.settings {
        return LintSettings::from_file(path).into_diagnostic();
    }

    if let Some(path) = LintSettings::discover(".") {
        info!("Using settings: {}", path.display());
        return LintSettings::from_file(&path).into_diagnostic();
    }

    info!("No settings file found, using defaults");
    Ok(LintSettings::new())
}

/// Builds the executor configuration from settings with command-line flags applied.
///
/// Returns `None` when the settings disable linting.
pub fn resolve_config(
    settings: &LintSettings,
    overrides: &Overrides,
) -> Result<Option<ExecutorConfig>> {
    let mut settings = settings.clone();

    if let Some(ref linter) = overrides.linter {
        settings.linter_path = Some(override_path(&settings, linter)?);
    }
    if let Some(ref config_file) = overrides.linter_config {
        settings.config_file = Some(override_path(&settings, config_file)?);
    }
    if let Some(ref rules_dir) = overrides.rules_dir {
        settings.rules_dir = Some(override_path(&settings, rules_dir)?);
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if overrides.no_launcher {
        settings.launcher = None;
    } else if let Some(ref launcher) = overrides.launcher {
        settings.launcher = Some(launcher.clone());
    }
    if let Some(max) = overrides.max_command_length {
        settings.max_command_length = max;
    }
    if let Some(jobs) = overrides.jobs {
        settings.jobs = jobs;
    }

    settings.executor_config().into_diagnostic()
}

/// Files from the command line, falling back to the settings file.
pub fn select_files(settings: &LintSettings, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files.to_vec());
    }

    settings
        .files()
        .ok_or_else(|| {
            ExecutorError::invalid_argument(
                "no files to lint: pass them on the command line or list them under `files` in the settings",
            )
        })
        .into_diagnostic()
}

// Settings resolve relative paths against their own directory, while flags are
// relative to the working directory.
fn override_path(settings: &LintSettings, path: &Path) -> Result<String> {
    let path = if path.is_relative() && settings.base_dir.is_some() {
        std::env::current_dir().into_diagnostic()?.join(path)
    } else {
        path.to_path_buf()
    };

    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| miette::miette!("Path is not valid UTF-8: {:?}", path))
}

//! Run command implementation

use std::path::PathBuf;

use lintbatch_core::BatchExecutor;
use miette::{IntoDiagnostic, Result};

use super::{load_settings, resolve_config, select_files};
use crate::cli::{Cli, OutputFormat, Overrides};
use crate::output::output_results;

pub fn run_lint(
    cli: &Cli,
    overrides: &Overrides,
    format: OutputFormat,
    files: &[PathBuf],
) -> Result<bool> {
    let settings = load_settings(cli)?;

    let Some(config) = resolve_config(&settings, overrides)? else {
        println!("Linting is disabled in the settings file, skipping");
        return Ok(false);
    };

    let files = select_files(&settings, files)?;

    let executor = BatchExecutor::new();
    let result = executor.run(&config, &files).into_diagnostic()?;

    output_results(&result, files.len(), format)
}

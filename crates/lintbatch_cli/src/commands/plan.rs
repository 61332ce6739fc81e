//! Plan command implementation

use std::io;
use std::path::PathBuf;

use lintbatch_core::{BatchPlanner, CommandBuilder, OutputFile, TempFileProvider};
use miette::{IntoDiagnostic, Result};

use super::{load_settings, resolve_config, select_files};
use crate::cli::{Cli, Overrides};

/// Placeholder shown instead of a real report path.
const OUTPUT_PLACEHOLDER: &str = "<output-file>";

/// Hands out the placeholder so planning never touches the filesystem.
struct PlaceholderOutput;

impl TempFileProvider for PlaceholderOutput {
    fn new_file(&self) -> io::Result<OutputFile> {
        Ok(OutputFile::unmanaged(OUTPUT_PLACEHOLDER))
    }
}

pub fn run_plan(cli: &Cli, overrides: &Overrides, files: &[PathBuf]) -> Result<()> {
    let settings = load_settings(cli)?;

    let Some(config) = resolve_config(&settings, overrides)? else {
        println!("Linting is disabled in the settings file, nothing to plan");
        return Ok(());
    };

    let files = select_files(&settings, files)?;
    let batches = BatchPlanner::new().plan(&config, &files).into_diagnostic()?;
    let builder = CommandBuilder::new(&PlaceholderOutput);

    for batch in &batches {
        let command = builder.build(&config, batch.files()).into_diagnostic()?;
        println!(
            "Batch {} of {}: {} file(s), timeout {} ms, {} bytes",
            batch.index() + 1,
            batches.len(),
            batch.len(),
            config.timeout_ms_for(batch.len()),
            BatchPlanner::rendered_len(&config, batch.files())
        );
        println!("  {}", command.to_command_line());
    }

    println!();
    println!(
        "Planned {} files in {} batches (limit {} bytes)",
        files.len(),
        batches.len(),
        config.max_command_length
    );

    Ok(())
}

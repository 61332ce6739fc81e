//! Output formatting module

mod json;
mod text;

use lintbatch_core::ExecutionResult;
use miette::Result;

use crate::cli::OutputFormat;

pub fn output_results(
    result: &ExecutionResult,
    files_checked: usize,
    format: OutputFormat,
) -> Result<bool> {
    match format {
        OutputFormat::Json => json::output_json(result)?,
        OutputFormat::Text => text::output_text(result, files_checked),
    }

    Ok(result.has_errors())
}

//! JSON output formatter

use lintbatch_core::ExecutionResult;
use miette::{IntoDiagnostic, Result};

pub fn output_json(result: &ExecutionResult) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(result.issues()).into_diagnostic()?
    );
    Ok(())
}

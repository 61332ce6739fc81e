//! Text output formatter

use std::path::Path;

use lintbatch_core::ExecutionResult;

pub fn output_text(result: &ExecutionResult, files_checked: usize) {
    let mut current: Option<&Path> = None;

    for issue in result.issues() {
        if current != Some(issue.path.as_path()) {
            println!("\n{}:", issue.path.display());
            current = Some(issue.path.as_path());
        }

        println!(
            "  {}:{}:{} {} [{}]: {}",
            issue.path.display(),
            issue.line,
            issue.column,
            issue.severity.as_str(),
            issue.rule_id.as_deref().unwrap_or("-"),
            issue.message
        );
    }

    println!();
    println!(
        "Checked {} files in {} batches, found {} issues ({} errors, {} warnings)",
        files_checked,
        result.batch_count(),
        result.len(),
        result.error_count(),
        result.warning_count()
    );
}

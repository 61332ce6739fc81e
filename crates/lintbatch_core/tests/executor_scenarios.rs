//! End-to-end executor behavior with an in-process fake for the linter.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use lintbatch_core::{
    BatchExecutor, BatchPlanner, CONFIG_FLAG, EslintJsonParser, ExecutorConfig, ExecutorError,
    InvocationOutcome, LintCommand, ProcessRunner, RULES_DIR_FLAG, SystemTempFiles,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

/// Records every command and answers with one `semi` error per file.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<(String, Duration)>>,
}

impl RecordingRunner {
    fn calls(&self) -> Vec<(String, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(
        &self,
        command: &LintCommand,
        timeout: Duration,
    ) -> Result<InvocationOutcome, ExecutorError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_command_line(), timeout));

        let files = files_of(command);
        let report: Vec<_> = files
            .iter()
            .map(|file| {
                serde_json::json!({
                    "filePath": file,
                    "messages": [{
                        "ruleId": "semi",
                        "severity": 2,
                        "message": "Missing semicolon.",
                        "line": 1,
                        "column": 10
                    }]
                })
            })
            .collect();
        fs::write(
            command.output_path(),
            serde_json::Value::Array(report).to_string(),
        )?;

        Ok(InvocationOutcome::new(
            Some(1),
            command.output_path(),
            timeout,
        ))
    }
}

fn files_of(command: &LintCommand) -> Vec<String> {
    let argv = command.argv();
    let start = argv
        .iter()
        .position(|arg| arg == CONFIG_FLAG)
        .map(|i| i + 2)
        .unwrap_or(argv.len());
    argv[start..]
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

type TestExecutor = BatchExecutor<RecordingRunner, EslintJsonParser, SystemTempFiles>;

fn executor(dir: &TempDir) -> TestExecutor {
    BatchExecutor::with_components(
        RecordingRunner::default(),
        EslintJsonParser::new(),
        SystemTempFiles::in_dir(dir.path()),
    )
}

fn config() -> ExecutorConfig {
    ExecutorConfig::new("path/to/eslint", "path/to/config")
        .with_rules_dir("path/to/rules")
        .with_timeout_ms_per_file(40_000)
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn numbered(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| PathBuf::from(format!("src/file_{i:03}.js")))
        .collect()
}

#[test]
fn test_single_batch_with_rules_dir() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);

    let result = executor
        .execute(&config(), &paths(&["path/to/file", "path/to/another"]))
        .unwrap();

    let calls = executor.runner().calls();
    assert_eq!(calls.len(), 1);

    let (command_line, timeout) = &calls[0];
    assert!(command_line.contains("--rules-dir path/to/rules"));
    assert!(command_line.starts_with("node path/to/eslint -f json --rules-dir path/to/rules --output-file "));
    assert!(command_line.ends_with("--config path/to/config path/to/file path/to/another"));
    assert_eq!(*timeout, Duration::from_millis(80_000));

    assert_eq!(result.batch_count(), 1);
    assert_eq!(result.len(), 2);
}

#[rstest]
#[case::absent(None)]
#[case::empty(Some(""))]
fn test_no_rules_dir_flag(#[case] rules_dir: Option<&str>) {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);
    let mut config = config();
    config.rules_dir = rules_dir.map(PathBuf::from);

    executor
        .execute(&config, &paths(&["path/to/file"]))
        .unwrap();

    let calls = executor.runner().calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].0.contains(RULES_DIR_FLAG));
}

#[test]
fn test_overlong_file_list_splits_into_two_batches() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);
    let config = config().with_max_command_length(500);
    let files = numbered(14);
    assert!(BatchPlanner::rendered_len(&config, &files) > config.max_command_length);

    let result = executor.execute(&config, &files).unwrap();

    let calls = executor.runner().calls();
    assert_eq!(calls.len(), 2);
    for (command_line, _) in &calls {
        assert!(
            command_line.len() <= config.max_command_length,
            "command too long ({}): {}",
            command_line.len(),
            command_line
        );
    }

    let batches = BatchPlanner::new().plan(&config, &files).unwrap();
    assert_eq!(batches.len(), 2);
    for batch in &batches {
        assert!(BatchPlanner::rendered_len(&config, batch.files()) <= config.max_command_length);
    }

    let reported: Vec<PathBuf> = result.issues().iter().map(|i| i.path.clone()).collect();
    assert_eq!(reported, files);
}

#[test]
fn test_missing_config_is_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);
    let files = paths(&["a.js"]);

    let err = executor.execute_optional(None, Some(&files)).unwrap_err();
    assert!(matches!(err, ExecutorError::InvalidArgument(_)));

    let err = executor
        .execute(&ExecutorConfig::default(), &files)
        .unwrap_err();
    assert!(matches!(err, ExecutorError::InvalidArgument(_)));

    assert!(executor.runner().calls().is_empty());
}

#[test]
fn test_missing_file_list_is_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);

    let err = executor.execute_optional(Some(&config()), None).unwrap_err();

    assert!(matches!(err, ExecutorError::InvalidArgument(_)));
    assert!(executor.runner().calls().is_empty());
}

#[test]
fn test_repeated_execution_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);
    let config = config().with_max_command_length(500);
    let files = numbered(30);

    let first = executor.execute(&config, &files).unwrap();
    let second = executor.execute(&config, &files).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);
    let config = config().with_max_command_length(500).with_jobs(4);
    let files = numbered(50);

    let sequential = executor.execute(&config, &files).unwrap();
    let parallel = executor.execute_parallel(&config, &files).unwrap();

    assert!(sequential.batch_count() > 2);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_report_files_are_removed_after_each_batch() {
    let dir = tempfile::tempdir().unwrap();
    let executor = executor(&dir);

    executor
        .execute(&config().with_max_command_length(500), &numbered(20))
        .unwrap();

    let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "leftover files: {:?}", leftovers);
}

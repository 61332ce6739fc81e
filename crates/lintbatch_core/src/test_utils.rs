use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use crate::ExecutorError;
use crate::command::{CONFIG_FLAG, LintCommand};
use crate::runner::{InvocationOutcome, ProcessRunner};
use crate::temp::{OutputFile, TempFileProvider};

/// Hands out either one fixed path or fresh paths inside a scratch directory.
pub struct FixedTempFiles {
    fixed: Option<PathBuf>,
    scratch: Option<TempDir>,
    requested: AtomicUsize,
}

impl FixedTempFiles {
    /// Always returns `path`. Nothing is created on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            fixed: Some(path.into()),
            scratch: None,
            requested: AtomicUsize::new(0),
        }
    }

    /// Returns a distinct path per request inside a temp directory.
    pub fn scratch() -> Self {
        Self {
            fixed: None,
            scratch: Some(tempfile::tempdir().expect("Failed to create scratch dir")),
            requested: AtomicUsize::new(0),
        }
    }

    pub fn requested(&self) -> usize {
        self.requested.load(Ordering::SeqCst)
    }
}

impl TempFileProvider for FixedTempFiles {
    fn new_file(&self) -> io::Result<OutputFile> {
        let n = self.requested.fetch_add(1, Ordering::SeqCst);
        match (&self.fixed, &self.scratch) {
            (Some(path), _) => Ok(OutputFile::unmanaged(path.clone())),
            (None, Some(dir)) => Ok(OutputFile::unmanaged(
                dir.path().join(format!("report-{n}.json")),
            )),
            (None, None) => unreachable!(),
        }
    }
}

/// A recorded call to [`ScriptedRunner`].
#[derive(Debug, Clone)]
pub struct Call {
    pub command_line: String,
    pub files: Vec<String>,
    pub timeout: Duration,
}

type Script = Box<dyn Fn(&LintCommand) -> (Option<i32>, Option<String>) + Send + Sync>;

/// Fake runner: records every call and writes a scripted report instead of spawning.
pub struct ScriptedRunner {
    script: Script,
    stderr: String,
    timeout_on_call: Option<usize>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRunner {
    pub fn with_script(
        script: impl Fn(&LintCommand) -> (Option<i32>, Option<String>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            stderr: String::new(),
            timeout_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Exits 0 without writing a report.
    pub fn clean() -> Self {
        Self::with_script(|_| (Some(0), None))
    }

    /// Reports one error per file and exits with `exit_code`.
    pub fn reporting_every_file(exit_code: i32) -> Self {
        Self::with_script(move |command| {
            (Some(exit_code), Some(eslint_report(&files_of(command))))
        })
    }

    /// Exits with `exit_code`, writes nothing, and prints `stderr`.
    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        let mut runner = Self::with_script(move |_| (Some(exit_code), None));
        runner.stderr = stderr.to_string();
        runner
    }

    /// Times out on the `index`-th call (0-based); other calls exit cleanly.
    pub fn timing_out_on_call(index: usize) -> Self {
        let mut runner = Self::clean();
        runner.timeout_on_call = Some(index);
        runner
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(
        &self,
        command: &LintCommand,
        timeout: Duration,
    ) -> Result<InvocationOutcome, ExecutorError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                command_line: command.to_command_line(),
                files: files_of(command),
                timeout,
            });
            calls.len() - 1
        };

        if self.timeout_on_call == Some(index) {
            return Err(ExecutorError::ProcessTimeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        }

        let (exit_code, report) = (self.script)(command);
        if let Some(report) = report {
            fs::write(command.output_path(), report)?;
        }

        let mut outcome = InvocationOutcome::new(exit_code, command.output_path(), timeout);
        outcome.stderr = self.stderr.clone();
        Ok(outcome)
    }
}

/// File arguments of a built command (everything after `--config <file>`).
pub fn files_of(command: &LintCommand) -> Vec<String> {
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

/// An ESLint JSON report with one `semi` error per file.
pub fn eslint_report(files: &[String]) -> String {
    let reports: Vec<_> = files
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
    serde_json::Value::Array(reports).to_string()
}

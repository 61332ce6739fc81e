//! Batch orchestration: plan, build, run, read, parse, concatenate.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::CommandBuilder;
use crate::issue::{Issue, Severity};
use crate::parser::{EslintJsonParser, ReportParser};
use crate::planner::{BatchPlanner, FileBatch};
use crate::runner::{InvocationOutcome, NativeProcessRunner, ProcessRunner};
use crate::temp::{SystemTempFiles, TempFileProvider};
use crate::{ExecutorConfig, ExecutorError, OUTPUT_PATH_RESERVE};

/// Issues collected from every batch, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    issues: Vec<Issue>,
    batches: usize,
}

impl ExecutionResult {
    /// All issues, batch 1 first.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes the result and returns the issues.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Number of batches that ran.
    pub fn batch_count(&self) -> usize {
        self.batches
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if no issues were found.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of error-level issues.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Returns `true` if any issue is an error.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    fn push_batch(&mut self, issues: Vec<Issue>) {
        self.issues.extend(issues);
        self.batches += 1;
    }
}

/// Cooperative cancellation flag, checked before each batch starts.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Batches already running finish or time out.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancellationToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs the linter over any number of files, one command line at a time.
///
/// The runner, parser, and temp-file source are injected so that tests can
/// substitute fakes for real processes.
pub struct BatchExecutor<R = NativeProcessRunner, P = EslintJsonParser, T = SystemTempFiles> {
    runner: R,
    parser: P,
    temp_files: T,
    planner: BatchPlanner,
    cancellation: Option<CancellationToken>,
}

impl BatchExecutor {
    /// Creates an executor that spawns real processes and parses ESLint JSON.
    pub fn new() -> Self {
        Self::with_components(
            NativeProcessRunner::new(),
            EslintJsonParser::new(),
            SystemTempFiles::new(),
        )
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P, T> BatchExecutor<R, P, T>
where
    R: ProcessRunner,
    P: ReportParser,
    T: TempFileProvider,
{
    /// Creates an executor from explicit components.
    pub fn with_components(runner: R, parser: P, temp_files: T) -> Self {
        Self {
            runner,
            parser,
            temp_files,
            planner: BatchPlanner::new(),
            cancellation: None,
        }
    }

    /// The process runner this executor drives.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Attaches a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Entry point for hosts whose config or file list may be absent.
    ///
    /// Fails with `InvalidArgument` if either is `None`, before any batch is planned.
    pub fn execute_optional(
        &self,
        config: Option<&ExecutorConfig>,
        files: Option<&[PathBuf]>,
    ) -> Result<ExecutionResult, ExecutorError> {
        let config =
            config.ok_or_else(|| ExecutorError::invalid_argument("no configuration supplied"))?;
        let files = files.ok_or_else(|| ExecutorError::invalid_argument("no file list supplied"))?;
        self.execute(config, files)
    }

    /// Lints `files` batch by batch. Batch N+1 starts only after batch N's report was read.
    ///
    /// Returns an empty result (not an error) when nothing was found.
    pub fn execute(
        &self,
        config: &ExecutorConfig,
        files: &[PathBuf],
    ) -> Result<ExecutionResult, ExecutorError> {
        validate_inputs(config, files)?;
        let started = Instant::now();

        let batches = self.planner.plan(config, files)?;
        let total = batches.len();

        let mut result = ExecutionResult::default();
        for batch in &batches {
            let issues = self.run_batch(config, batch, total, result.batch_count())?;
            result.push_batch(issues);
        }

        info!(
            "Linted {} file(s) in {} batch(es) in {:?}: {} issue(s)",
            files.len(),
            result.batch_count(),
            started.elapsed(),
            result.len()
        );
        Ok(result)
    }

    fn run_batch(
        &self,
        config: &ExecutorConfig,
        batch: &FileBatch,
        total: usize,
        completed: usize,
    ) -> Result<Vec<Issue>, ExecutorError> {
        self.check_cancelled(completed)?;
        self.lint_batch(config, batch)
            .map_err(|e| e.in_batch(batch.index(), total, batch.len()))
    }

    fn lint_batch(
        &self,
        config: &ExecutorConfig,
        batch: &FileBatch,
    ) -> Result<Vec<Issue>, ExecutorError> {
        let command = CommandBuilder::new(&self.temp_files).build(config, batch.files())?;

        let output_len = command.output_path().as_os_str().len();
        if output_len > OUTPUT_PATH_RESERVE && command.rendered_len() > config.max_command_length {
            return Err(ExecutorError::invalid_configuration(format!(
                "output path {} is {} bytes, more than the {} reserved for it; the command would be {} bytes (limit {})",
                command.output_path().display(),
                output_len,
                OUTPUT_PATH_RESERVE,
                command.rendered_len(),
                config.max_command_length
            )));
        }

        let timeout = config.timeout_for(batch.len());

        debug!(
            "Running batch {} ({} file(s), timeout {:?})",
            batch.index() + 1,
            batch.len(),
            timeout
        );
        let outcome = self.runner.run(&command, timeout)?;

        if !outcome.stderr.trim().is_empty() {
            warn!(
                "Linter stderr (batch {}): {}",
                batch.index() + 1,
                outcome.stderr.trim()
            );
        }

        let report = command.output().read()?.unwrap_or_default();
        drop(command);
        self.interpret(outcome, &report)
    }

    /// A blank report is only acceptable from a clean exit; anything else must parse.
    fn interpret(
        &self,
        outcome: InvocationOutcome,
        report: &[u8],
    ) -> Result<Vec<Issue>, ExecutorError> {
        let blank = report.iter().all(u8::is_ascii_whitespace);

        if blank && !outcome.success() {
            return Err(ExecutorError::ProcessFailed {
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            });
        }

        let issues = self.parser.parse(report)?;
        if !outcome.success() {
            debug!(
                "Linter exited with {:?} and reported {} issue(s)",
                outcome.exit_code,
                issues.len()
            );
        }
        Ok(issues)
    }

    fn check_cancelled(&self, completed: usize) -> Result<(), ExecutorError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(ExecutorError::Cancelled { completed }),
            _ => Ok(()),
        }
    }
}

impl<R, P, T> BatchExecutor<R, P, T>
where
    R: ProcessRunner + Sync,
    P: ReportParser + Sync,
    T: TempFileProvider + Sync,
{
    /// Runs up to `config.jobs` batches at once.
    ///
    /// Issues are concatenated by batch index, so the result matches
    /// [`BatchExecutor::execute`]. Once a batch fails no further batches are
    /// started; batches already running finish. Of the batches that ran, the
    /// lowest failing index is reported.
    pub fn execute_parallel(
        &self,
        config: &ExecutorConfig,
        files: &[PathBuf],
    ) -> Result<ExecutionResult, ExecutorError> {
        validate_inputs(config, files)?;
        let started = Instant::now();

        let batches = self.planner.plan(config, files)?;
        let total = batches.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs.max(1))
            .build()
            .map_err(|e| ExecutorError::Io(std::io::Error::other(e)))?;

        let failed = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);

        // `None` marks a batch skipped after another one failed.
        let outcomes: Vec<Option<Result<Vec<Issue>, ExecutorError>>> = pool.install(|| {
            batches
                .par_iter()
                .map(|batch| {
                    if failed.load(Ordering::SeqCst) {
                        return None;
                    }
                    let outcome =
                        self.run_batch(config, batch, total, completed.load(Ordering::SeqCst));
                    if outcome.is_ok() {
                        completed.fetch_add(1, Ordering::SeqCst);
                    } else {
                        failed.store(true, Ordering::SeqCst);
                    }
                    Some(outcome)
                })
                .collect()
        });

        // Skipped batches only exist alongside a failed one, so `?` returns early.
        let mut result = ExecutionResult::default();
        for outcome in outcomes.into_iter().flatten() {
            result.push_batch(outcome?);
        }

        info!(
            "Linted {} file(s) in {} batch(es) ({} jobs) in {:?}: {} issue(s)",
            files.len(),
            result.batch_count(),
            config.jobs,
            started.elapsed(),
            result.len()
        );
        Ok(result)
    }

    /// Runs sequentially or in parallel depending on `config.jobs`.
    pub fn run(
        &self,
        config: &ExecutorConfig,
        files: &[PathBuf],
    ) -> Result<ExecutionResult, ExecutorError> {
        if config.jobs > 1 {
            self.execute_parallel(config, files)
        } else {
            self.execute(config, files)
        }
    }
}

fn validate_inputs(config: &ExecutorConfig, files: &[PathBuf]) -> Result<(), ExecutorError> {
    config
        .validate()
        .map_err(|e| ExecutorError::invalid_argument(e.to_string()))?;

    if let Some(position) = files
        .iter()
        .position(|file| file.as_os_str().to_string_lossy().trim().is_empty())
    {
        return Err(ExecutorError::invalid_argument(format!(
            "file path at position {} is blank",
            position
        )));
    }
    Ok(())
}

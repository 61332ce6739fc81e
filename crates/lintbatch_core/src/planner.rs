//! Splits a file list into batches that fit on one command line.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::rendered_prefix_len;
use crate::{ExecutorConfig, ExecutorError};

/// Files assigned to one linter invocation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBatch {
    index: usize,
    files: Vec<PathBuf>,
}

impl FileBatch {
    /// Position of this batch in the plan (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Files in input order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of files in the batch.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always `false` for planned batches.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consumes the batch and returns its files.
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

/// Greedy planner bounded by `ExecutorConfig::max_command_length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchPlanner;

impl BatchPlanner {
    /// Creates a planner.
    pub fn new() -> Self {
        Self
    }

    /// Splits `files` into ordered batches.
    ///
    /// Each file lands in exactly one batch and batches keep input order. A new
    /// batch starts only when adding the next file would push the rendered
    /// command past the limit, so a single over-long path still gets a batch of its own.
    pub fn plan(
        &self,
        config: &ExecutorConfig,
        files: &[PathBuf],
    ) -> Result<Vec<FileBatch>, ExecutorError> {
        config.validate()?;

        let prefix_len = rendered_prefix_len(config);
        let max = config.max_command_length;

        let mut batches = Vec::new();
        let mut current: Vec<PathBuf> = Vec::new();
        let mut current_len = prefix_len;

        for file in files {
            let candidate_len = current_len + 1 + path_len(file);
            if candidate_len > max && !current.is_empty() {
                batches.push(FileBatch {
                    index: batches.len(),
                    files: std::mem::take(&mut current),
                });
                current_len = prefix_len;
            }
            current_len += 1 + path_len(file);
            current.push(file.clone());
        }

        if !current.is_empty() {
            batches.push(FileBatch {
                index: batches.len(),
                files: current,
            });
        }

        debug!(
            "Planned {} batch(es) for {} file(s) (limit {} bytes)",
            batches.len(),
            files.len(),
            max
        );
        Ok(batches)
    }

    /// Rendered command length for `batch` under `config`, with the output path reserved.
    pub fn rendered_len(config: &ExecutorConfig, batch: &[PathBuf]) -> usize {
        rendered_prefix_len(config) + batch.iter().map(|file| 1 + path_len(file)).sum::<usize>()
    }
}

fn path_len(path: &Path) -> usize {
    path.as_os_str().len()
}

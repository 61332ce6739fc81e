//! Output files for linter reports.
//!
//! Every invocation writes its report to a fresh file handed out by a
//! [`TempFileProvider`]. The [`OutputFile`] guard removes the file when it is
//! dropped, so a report never outlives the batch that produced it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

/// Source of exclusive, writable report files.
///
/// Each call must return a distinct path so that batches never share an output file.
/// Paths longer than [`crate::OUTPUT_PATH_RESERVE`] bytes can push a planned batch
/// past the command length limit; the executor rejects such batches.
pub trait TempFileProvider {
    /// Creates a new output file.
    fn new_file(&self) -> io::Result<OutputFile>;
}

/// A report file owned by a single invocation.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl OutputFile {
    /// Wraps a temp file that is deleted on drop.
    pub fn temporary(path: TempPath) -> Self {
        Self {
            path: path.to_path_buf(),
            guard: Some(path),
        }
    }

    /// Wraps a path that the caller manages. Nothing is deleted on drop.
    pub fn unmanaged(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: None,
        }
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the report. A missing file reads as `None`.
    pub fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take()
            && let Err(e) = guard.close()
        {
            // The linter may have replaced or removed the file itself.
            if e.kind() != io::ErrorKind::NotFound {
                debug!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Creates report files in the system temp directory (or a chosen directory).
#[derive(Debug, Clone)]
pub struct SystemTempFiles {
    dir: Option<PathBuf>,
    prefix: String,
}

impl SystemTempFiles {
    /// Creates a provider that writes to the system temp directory.
    pub fn new() -> Self {
        Self {
            dir: None,
            prefix: "lintbatch-".to_string(),
        }
    }

    /// Creates a provider that writes to `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::new()
        }
    }
}

impl Default for SystemTempFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl TempFileProvider for SystemTempFiles {
    fn new_file(&self) -> io::Result<OutputFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix).suffix(".json");

        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let path = file.into_temp_path();
        debug!("Created output file {}", path.display());

        Ok(OutputFile::temporary(path))
    }
}

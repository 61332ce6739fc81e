//! Command line construction for a single linter invocation.
//!
//! The rendered shape is:
//!
//! ```text
//! [launcher] <linter> -f <format> [--rules-dir <dir>] --output-file <out> --config <config> <file>...
//! ```

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::temp::{OutputFile, TempFileProvider};
use crate::{ExecutorConfig, ExecutorError};

/// Flag selecting the report format.
pub const FORMAT_FLAG: &str = "-f";
/// Flag passing the additional rules directory.
pub const RULES_DIR_FLAG: &str = "--rules-dir";
/// Flag passing the report destination.
pub const OUTPUT_FILE_FLAG: &str = "--output-file";
/// Flag passing the linter configuration file.
pub const CONFIG_FLAG: &str = "--config";

/// A fully built invocation: the argument vector plus the report file it writes to.
///
/// Dropping the command releases its output file.
#[derive(Debug)]
pub struct LintCommand {
    argv: Vec<OsString>,
    output: OutputFile,
}

impl LintCommand {
    /// Creates a command from a raw argument vector. `argv[0]` is the program.
    pub fn new<I, S>(argv: I, output: OutputFile) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            output,
        }
    }

    /// The program to execute.
    pub fn program(&self) -> &OsStr {
        self.argv.first().map(OsString::as_os_str).unwrap_or_default()
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[OsString] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// The complete argument vector, program first.
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    /// The report file for this invocation.
    pub fn output(&self) -> &OutputFile {
        &self.output
    }

    /// Path of the report file.
    pub fn output_path(&self) -> &Path {
        self.output.path()
    }

    /// Renders the argument vector joined by single spaces.
    pub fn to_command_line(&self) -> String {
        self.argv
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Length of [`LintCommand::to_command_line`] without allocating it.
    pub fn rendered_len(&self) -> usize {
        rendered_len(self.argv.iter().map(OsString::as_os_str))
    }

    /// Converts into a `std::process::Command` (argv style, no shell).
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.program());
        command.args(self.args());
        command
    }
}

/// Builds [`LintCommand`]s, requesting one output file per command.
pub struct CommandBuilder<'a, T: ?Sized> {
    temp_files: &'a T,
}

impl<'a, T: TempFileProvider + ?Sized> CommandBuilder<'a, T> {
    /// Creates a builder that draws output files from `temp_files`.
    pub fn new(temp_files: &'a T) -> Self {
        Self { temp_files }
    }

    /// Builds the invocation for one batch.
    ///
    /// Fails with `InvalidConfiguration` for an unusable config and with
    /// `InvalidInput` for an empty batch. No output file is requested in either case.
    pub fn build(
        &self,
        config: &ExecutorConfig,
        batch: &[PathBuf],
    ) -> Result<LintCommand, ExecutorError> {
        config.validate()?;
        if batch.is_empty() {
            return Err(ExecutorError::invalid_input(
                "cannot build a command for an empty batch",
            ));
        }

        let output = self.temp_files.new_file()?;

        let mut argv = prefix_args(config, output.path().as_os_str());
        argv.extend(batch.iter().map(|file| file.as_os_str().to_os_string()));

        let command = LintCommand { argv, output };
        debug!("Built command: {}", command.to_command_line());
        Ok(command)
    }
}

/// Rendered length of the fixed part of a command (everything before the files).
///
/// The output path is counted as [`crate::OUTPUT_PATH_RESERVE`] bytes.
pub fn rendered_prefix_len(config: &ExecutorConfig) -> usize {
    let args = prefix_args(config, OsStr::new(""));
    rendered_len(args.iter().map(OsString::as_os_str)) + crate::OUTPUT_PATH_RESERVE
}

fn prefix_args(config: &ExecutorConfig, output_path: &OsStr) -> Vec<OsString> {
    let mut argv: Vec<OsString> = Vec::with_capacity(10);

    if let Some(launcher) = config.effective_launcher() {
        argv.push(launcher.into());
    }
    argv.push(config.linter_path.clone().into_os_string());
    argv.push(FORMAT_FLAG.into());
    argv.push(config.output_format.clone().into());

    if let Some(rules_dir) = config.effective_rules_dir() {
        argv.push(RULES_DIR_FLAG.into());
        argv.push(rules_dir.as_os_str().to_os_string());
    }

    argv.push(OUTPUT_FILE_FLAG.into());
    argv.push(output_path.to_os_string());
    argv.push(CONFIG_FLAG.into());
    argv.push(config.config_file.clone().into_os_string());

    argv
}

fn rendered_len<'s>(args: impl Iterator<Item = &'s OsStr>) -> usize {
    let mut len: usize = 0;
    let mut count: usize = 0;
    for arg in args {
        len += arg.len();
        count += 1;
    }
    len + count.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FixedTempFiles;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn config() -> ExecutorConfig {
        ExecutorConfig::new("path/to/eslint", "path/to/config")
            .with_rules_dir("path/to/rules")
            .with_timeout_ms_per_file(40_000)
    }

    fn files(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_build_renders_full_command() {
        let temp = FixedTempFiles::new("path/to/temp");
        let command = CommandBuilder::new(&temp)
            .build(&config(), &files(&["path/to/file", "path/to/another"]))
            .unwrap();

        assert_eq!(
            command.to_command_line(),
            "node path/to/eslint -f json --rules-dir path/to/rules --output-file path/to/temp --config path/to/config path/to/file path/to/another"
        );
        assert_eq!(command.program(), "node");
        assert_eq!(command.output_path(), Path::new("path/to/temp"));
        assert_eq!(command.rendered_len(), command.to_command_line().len());
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(""))]
    fn test_build_omits_rules_dir(#[case] rules_dir: Option<&str>) {
        let mut config = config();
        config.rules_dir = rules_dir.map(PathBuf::from);
        let temp = FixedTempFiles::new("path/to/temp");

        let command = CommandBuilder::new(&temp)
            .build(&config, &files(&["path/to/file"]))
            .unwrap();

        assert!(!command.to_command_line().contains("--rules-dir"));
        assert!(!command.argv().iter().any(|arg| arg == RULES_DIR_FLAG));
    }

    #[test]
    fn test_build_without_launcher() {
        let temp = FixedTempFiles::new("out.json");
        let command = CommandBuilder::new(&temp)
            .build(&config().without_launcher(), &files(&["a.js"]))
            .unwrap();

        assert_eq!(command.program(), "path/to/eslint");
        assert_eq!(command.args()[0], "-f");
        assert_eq!(command.args().last().unwrap(), "a.js");
    }

    #[test]
    fn test_build_keeps_file_order_as_separate_args() {
        let temp = FixedTempFiles::new("out.json");
        let batch = files(&["z.js", "dir with space/a.js", "m.js"]);
        let command = CommandBuilder::new(&temp).build(&config(), &batch).unwrap();

        let tail: Vec<_> = command.argv()[command.argv().len() - 3..].to_vec();
        assert_eq!(
            tail,
            vec![
                OsString::from("z.js"),
                OsString::from("dir with space/a.js"),
                OsString::from("m.js")
            ]
        );
    }

    #[test]
    fn test_build_requests_one_output_file() {
        let temp = FixedTempFiles::new("out.json");
        let builder = CommandBuilder::new(&temp);

        builder.build(&config(), &files(&["a.js"])).unwrap();
        builder.build(&config(), &files(&["b.js"])).unwrap();

        assert_eq!(temp.requested(), 2);
    }

    #[test]
    fn test_build_rejects_empty_batch() {
        let temp = FixedTempFiles::new("out.json");
        let err = CommandBuilder::new(&temp).build(&config(), &[]).unwrap_err();

        assert!(matches!(err, ExecutorError::InvalidInput(_)));
        assert_eq!(temp.requested(), 0);
    }

    #[test]
    fn test_build_rejects_unpopulated_config() {
        let temp = FixedTempFiles::new("out.json");
        let err = CommandBuilder::new(&temp)
            .build(&ExecutorConfig::default(), &files(&["a.js"]))
            .unwrap_err();

        assert!(matches!(err, ExecutorError::InvalidConfiguration(_)));
        assert_eq!(temp.requested(), 0);
    }

    #[test]
    fn test_prefix_len_reserves_output_path() {
        let config = config();
        let expected = "node path/to/eslint -f json --rules-dir path/to/rules --output-file  --config path/to/config".len()
            + crate::OUTPUT_PATH_RESERVE;

        assert_eq!(rendered_prefix_len(&config), expected);
    }

    #[test]
    fn test_to_command_uses_argv() {
        let temp = FixedTempFiles::new("out.json");
        let command = CommandBuilder::new(&temp)
            .build(&config(), &files(&["a.js"]))
            .unwrap();
        let std_command = command.to_command();

        assert_eq!(std_command.get_program(), "node");
        assert_eq!(std_command.get_args().count(), command.args().len());
    }
}

//! Report parsing.

use std::path::PathBuf;

use serde::Deserialize;

use crate::ExecutorError;
use crate::issue::{Issue, Severity};

/// Turns the raw contents of a report file into issues.
pub trait ReportParser {
    /// Parses `raw`. Empty input must yield no issues rather than an error.
    fn parse(&self, raw: &[u8]) -> Result<Vec<Issue>, ExecutorError>;
}

/// Parser for ESLint's `-f json` report.
#[derive(Debug, Clone, Copy, Default)]
pub struct EslintJsonParser;

impl EslintJsonParser {
    /// Creates a parser.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    file_path: PathBuf,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    severity: u8,
    #[serde(default)]
    fatal: bool,
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    #[serde(default)]
    end_line: Option<u32>,
    #[serde(default)]
    end_column: Option<u32>,
}

impl Message {
    fn severity(&self) -> Severity {
        match (self.fatal, self.severity) {
            (true, _) | (_, 2) => Severity::Error,
            (_, 1) => Severity::Warning,
            _ => Severity::Info,
        }
    }

    fn into_issue(self, path: PathBuf) -> Issue {
        let severity = self.severity();
        Issue::new(
            path,
            self.rule_id,
            self.message,
            self.line.unwrap_or(1),
            self.column.unwrap_or(1),
        )
        .with_severity(severity)
        .with_end(self.end_line, self.end_column)
    }
}

impl ReportParser for EslintJsonParser {
    fn parse(&self, raw: &[u8]) -> Result<Vec<Issue>, ExecutorError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let reports: Vec<FileReport> = serde_json::from_slice(raw)
            .map_err(|e| ExecutorError::parse(format!("Invalid ESLint report: {}", e)))?;

        Ok(reports
            .into_iter()
            .flat_map(|report| {
                let path = report.file_path;
                report
                    .messages
                    .into_iter()
                    .map(move |message| message.into_issue(path.clone()))
            })
            .collect())
    }
}

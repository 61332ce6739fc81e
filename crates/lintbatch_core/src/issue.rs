//! Structured lint findings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Severity level for issues.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    #[default]
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
}

impl Severity {
    /// Lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// A single finding reported by the linter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// File the issue belongs to.
    pub path: PathBuf,

    /// Rule that produced the issue. `None` for fatal parse errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Severity level.
    #[serde(default)]
    pub severity: Severity,

    /// Human readable message.
    pub message: String,

    /// 1-based start line.
    pub line: u32,

    /// 1-based start column.
    pub column: u32,

    /// 1-based end line, when the linter reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,

    /// 1-based end column, when the linter reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl Issue {
    /// Creates a new issue at `line:column`.
    pub fn new(
        path: impl Into<PathBuf>,
        rule_id: Option<String>,
        message: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            path: path.into(),
            rule_id,
            severity: Severity::Error,
            message: message.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the end position.
    pub fn with_end(mut self, end_line: Option<u32>, end_column: Option<u32>) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }
}

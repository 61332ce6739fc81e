//! Settings file loading.
//!
//! Settings are the host-facing source of an [`ExecutorConfig`]. They are read
//! from `.lintbatch.jsonc` / `.lintbatch.json`, validated against the embedded
//! schema, and may switch the linter off entirely with `"enabled": false`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_LAUNCHER, DEFAULT_MAX_COMMAND_LENGTH, DEFAULT_OUTPUT_FORMAT,
    DEFAULT_TIMEOUT_MS_PER_FILE,
};
use crate::{ExecutorConfig, ExecutorError};

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/settings.json");
static SETTINGS_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Settings as written in a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintSettings {
    /// Whether the linter runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Path to the linter entry point.
    #[serde(default)]
    pub linter_path: Option<String>,

    /// Linter configuration file.
    #[serde(default)]
    pub config_file: Option<String>,

    /// Additional rules directory.
    #[serde(default)]
    pub rules_dir: Option<String>,

    /// Timeout budget per file in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Runtime launcher. `null` runs the linter directly.
    #[serde(default = "default_launcher")]
    pub launcher: Option<String>,

    /// Maximum rendered command length.
    #[serde(default = "default_max_command_length")]
    pub max_command_length: usize,

    /// Number of batches that may run at once.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Files to lint when the caller supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    /// Directory relative paths are resolved against.
    /// This is usually the directory containing the settings file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS_PER_FILE
}

fn default_launcher() -> Option<String> {
    Some(DEFAULT_LAUNCHER.to_string())
}

fn default_max_command_length() -> usize {
    DEFAULT_MAX_COMMAND_LENGTH
}

fn default_jobs() -> usize {
    1
}

impl LintSettings {
    /// Settings file names, in lookup order.
    pub const CONFIG_FILES: &'static [&'static str] = &[".lintbatch.jsonc", ".lintbatch.json"];

    /// Creates settings with every default and no paths.
    pub fn new() -> Self {
        Self {
            enabled: default_enabled(),
            linter_path: None,
            config_file: None,
            rules_dir: None,
            timeout_ms: default_timeout_ms(),
            launcher: default_launcher(),
            max_command_length: default_max_command_length(),
            jobs: default_jobs(),
            files: None,
            base_dir: None,
        }
    }

    /// Finds a settings file in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads settings from a file. Comments and trailing commas are accepted.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExecutorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExecutorError::settings(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut settings = Self::from_jsonc(&content)?;

        if let Some(parent) = path.parent() {
            settings.base_dir = Some(parent.to_path_buf());
        }

        Ok(settings)
    }

    /// Parses settings from JSONC text with schema validation.
    pub fn from_jsonc(text: &str) -> Result<Self, ExecutorError> {
        let value = jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
            .map_err(|e| ExecutorError::settings(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let schema = SETTINGS_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded settings schema");
            Validator::new(&schema_json).expect("Invalid settings schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            return Err(ExecutorError::settings(format!(
                "Settings validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| ExecutorError::settings(format!("Invalid settings: {}", e)))
    }

    /// Builds the executor configuration.
    ///
    /// Returns `Ok(None)` when the settings disable the linter.
    pub fn executor_config(&self) -> Result<Option<ExecutorConfig>, ExecutorError> {
        if !self.enabled {
            return Ok(None);
        }

        let linter_path = self
            .linter_path
            .as_deref()
            .ok_or_else(|| ExecutorError::settings("linter_path is required"))?;
        let config_file = self
            .config_file
            .as_deref()
            .ok_or_else(|| ExecutorError::settings("config_file is required"))?;

        let config = ExecutorConfig {
            linter_path: self.resolve(linter_path),
            config_file: self.resolve(config_file),
            rules_dir: self
                .rules_dir
                .as_deref()
                .filter(|dir| !dir.trim().is_empty())
                .map(|dir| self.resolve(dir)),
            timeout_ms_per_file: self.timeout_ms,
            launcher: self.launcher.clone(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            max_command_length: self.max_command_length,
            jobs: self.jobs.max(1),
        };
        config.validate()?;

        Ok(Some(config))
    }

    /// Files listed in the settings, resolved against the base directory.
    pub fn files(&self) -> Option<Vec<PathBuf>> {
        self.files
            .as_ref()
            .map(|files| files.iter().map(|file| self.resolve(file)).collect())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for LintSettings {
    fn default() -> Self {
        Self::new()
    }
}

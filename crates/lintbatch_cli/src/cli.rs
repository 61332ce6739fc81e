//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// lintbatch - Run an external linter over many files in batches
#[derive(Parser)]
#[command(name = "lintbatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file path
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint files
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Files to lint (defaults to the `files` list in the settings file)
        files: Vec<PathBuf>,
    },

    /// Show the batches and command lines a run would use, without running them
    Plan {
        #[command(flatten)]
        overrides: Overrides,

        /// Files to plan (defaults to the `files` list in the settings file)
        files: Vec<PathBuf>,
    },
}

/// Settings that can be given on the command line. Flags win over the settings file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Linter entry point
    #[arg(long, value_name = "PATH")]
    pub linter: Option<PathBuf>,

    /// Linter configuration file
    #[arg(long, value_name = "PATH")]
    pub linter_config: Option<PathBuf>,

    /// Additional rules directory
    #[arg(long, value_name = "DIR")]
    pub rules_dir: Option<PathBuf>,

    /// Timeout per file in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Runtime used to start the linter
    #[arg(long, value_name = "CMD", conflicts_with = "no_launcher")]
    pub launcher: Option<String>,

    /// Run the linter directly, without a launcher
    #[arg(long)]
    pub no_launcher: bool,

    /// Maximum rendered command line length
    #[arg(long, value_name = "N")]
    pub max_command_length: Option<usize>,

    /// Number of batches to run at once
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

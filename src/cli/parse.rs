//! CLI parse: clap types for casegen. No behavior; definitions only.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// casegen - Deterministic testcase generation and validation
#[derive(Parser)]
#[command(name = "casegen")]
#[command(about = "Deterministic testcase generation and validation for problem packages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Problem root directory
    #[arg(long, default_value = ".")]
    pub problem: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Plan file (defaults to the configured plan_file)
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate, validate and export every testcase
    Generate {
        #[command(flatten)]
        plan: PlanArgs,
        /// Maximum number of cases in flight
        #[arg(long)]
        jobs: Option<usize>,
        /// Cancel remaining cases after the first failure
        #[arg(long)]
        fail_fast: bool,
        /// Regenerate every case even when stored artifacts are current
        #[arg(long)]
        no_cache: bool,
        /// Skip the built-in whitespace checks
        #[arg(long)]
        no_sanity_checks: bool,
        /// Delete artifact files in the data directory that no case produced
        #[arg(long)]
        prune: bool,
        /// Do not write artifacts to the data directory
        #[arg(long)]
        no_export: bool,
    },
    /// Load and schedule the plan without running any program
    Check {
        #[command(flatten)]
        plan: PlanArgs,
    },
    /// Print the resolved tree with names and seeds
    Show {
        #[command(flatten)]
        plan: PlanArgs,
    },
}

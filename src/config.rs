//! Configuration System
//!
//! Layered engine settings: built-in defaults, the global file, the problem's
//! `casegen.toml` (plus an environment-specific variant), then `CASEGEN__*`
//! environment variables. CLI flags are applied on top by the caller.

use crate::command::CommandTemplate;
use crate::error::EngineError;
use crate::generation::{ExecutorSettings, FailurePolicy};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod merge;
mod sources;

pub use sources::global_file::{global_config_path, CONFIG_HOME_ENV};
pub use sources::workspace_file::{ENV_NAME_ENV, PROBLEM_CONFIG_FILE};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of cases in flight
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default = "default_timeout_secs")]
    pub generator_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub solution_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub visualizer_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub validator_timeout_secs: u64,

    /// Solution command used when the plan names none
    #[serde(default)]
    pub default_solution: Option<String>,

    #[serde(default)]
    pub fail_fast: bool,

    #[serde(default = "default_true")]
    pub sanity_checks: bool,

    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Artifact store location, relative to the problem root
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Plan file, relative to the problem root
    #[serde(default = "default_plan_file")]
    pub plan_file: PathBuf,

    /// Export directory, relative to the problem root
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,
}

pub(crate) fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".casegen/store")
}

fn default_plan_file() -> PathBuf {
    PathBuf::from("generators/generators.yaml")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            generator_timeout_secs: default_timeout_secs(),
            solution_timeout_secs: default_timeout_secs(),
            visualizer_timeout_secs: default_timeout_secs(),
            validator_timeout_secs: default_timeout_secs(),
            default_solution: None,
            fail_fast: false,
            sanity_checks: true,
            use_cache: true,
            store_path: default_store_path(),
            plan_file: default_plan_file(),
            data_dir: default_data_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    Setting(&'static str, String),
    Logging(String),
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::Setting(key, msg) => write!(f, "{}: {}", key, msg),
            ConfigIssue::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigIssue {}

impl EngineConfig {
    /// Validate the entire configuration, reporting every problem found.
    pub fn validate(&self) -> Result<(), Vec<ConfigIssue>> {
        let mut errors = Vec::new();

        if self.jobs == 0 {
            errors.push(ConfigIssue::Setting("jobs", "must be at least 1".to_string()));
        }

        for (key, secs) in [
            ("generator_timeout_secs", self.generator_timeout_secs),
            ("solution_timeout_secs", self.solution_timeout_secs),
            ("visualizer_timeout_secs", self.visualizer_timeout_secs),
            ("validator_timeout_secs", self.validator_timeout_secs),
        ] {
            if secs == 0 {
                errors.push(ConfigIssue::Setting(key, "must be positive".to_string()));
            }
        }

        if let Some(command) = &self.default_solution {
            if let Err(e) = CommandTemplate::parse(command) {
                errors.push(ConfigIssue::Setting("default_solution", e.to_string()));
            }
        }

        for (key, path) in [
            ("store_path", &self.store_path),
            ("plan_file", &self.plan_file),
            ("data_dir", &self.data_dir),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ConfigIssue::Setting(key, "cannot be empty".to_string()));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ConfigIssue::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and collapse all issues into one error.
    pub fn ensure_valid(&self) -> Result<(), EngineError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            EngineError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Executor settings derived from this configuration.
    pub fn executor_settings(&self) -> Result<ExecutorSettings, EngineError> {
        self.ensure_valid()?;
        let default_solution = self
            .default_solution
            .as_deref()
            .map(CommandTemplate::parse)
            .transpose()
            .map_err(|e| EngineError::ConfigError(format!("default_solution: {}", e)))?;
        Ok(ExecutorSettings {
            jobs: self.jobs,
            generator_time_limit: Duration::from_secs(self.generator_timeout_secs),
            solution_time_limit: Duration::from_secs(self.solution_timeout_secs),
            visualizer_time_limit: Duration::from_secs(self.visualizer_timeout_secs),
            validator_time_limit: Duration::from_secs(self.validator_timeout_secs),
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Continue
            },
            default_solution,
            sanity_checks: self.sanity_checks,
            use_cache: self.use_cache,
        })
    }

    pub fn store_dir(&self, problem_root: &Path) -> PathBuf {
        problem_root.join(&self.store_path)
    }

    pub fn plan_path(&self, problem_root: &Path) -> PathBuf {
        problem_root.join(&self.plan_file)
    }

    pub fn data_path(&self, problem_root: &Path) -> PathBuf {
        problem_root.join(&self.data_dir)
    }
}

/// Builds an [`EngineConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a problem directory.
    pub fn load(problem_root: &Path) -> Result<EngineConfig, EngineError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, problem_root)?;
        let builder = sources::environment::add_to_builder(builder);
        let config: EngineConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from one explicit file over the defaults.
    pub fn load_from_file(path: &Path) -> Result<EngineConfig, EngineError> {
        if !path.is_file() {
            return Err(EngineError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).required(true));
        let config: EngineConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Path of the global config file, if one can be located.
    pub fn global_config_path() -> Option<PathBuf> {
        global_config_path()
    }
}

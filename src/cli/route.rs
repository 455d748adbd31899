//! CLI route: single route table and run context. Dispatches to the engine and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, OutputFormat, PlanArgs};
use crate::cli::presentation::{
    format_check_text, format_export_summary, format_report_json, format_report_text,
    format_tree_text,
};
use crate::config::{ConfigLoader, EngineConfig};
use crate::engine::{Engine, LoadedPlan};
use crate::export::Exporter;
use crate::report::Report;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// Rendered command result. `success` decides the process exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// Runtime context for CLI execution: problem root and merged configuration.
pub struct RunContext {
    problem_root: PathBuf,
    config: EngineConfig,
}

impl RunContext {
    /// Create run context from problem root and optional config path. Uses ConfigLoader only.
    pub fn new(problem_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&problem_root)?,
        };
        config.ensure_valid()?;
        Ok(Self {
            problem_root,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn problem_root(&self) -> &Path {
        &self.problem_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput> {
        let span = info_span!("command", name = command_name(command));
        let _enter = span.enter();

        match command {
            Commands::Check { plan } => {
                let loaded = self.load(plan)?;
                let text = match plan.format {
                    OutputFormat::Text => format_check_text(&loaded),
                    OutputFormat::Json => serde_json::to_string_pretty(&json!({
                        "valid": true,
                        "cases": loaded.schedule.total_cases,
                        "levels": loaded.schedule.total_levels,
                    }))?,
                };
                Ok(CommandOutput::ok(text))
            }
            Commands::Show { plan } => {
                let report = self.load(plan)?.report();
                let text = match plan.format {
                    OutputFormat::Text => format_tree_text(&report),
                    OutputFormat::Json => format_report_json(&report)?,
                };
                Ok(CommandOutput::ok(text))
            }
            Commands::Generate {
                plan,
                jobs,
                fail_fast,
                no_cache,
                no_sanity_checks,
                prune,
                no_export,
            } => {
                let mut config = self.config.clone();
                if let Some(jobs) = jobs {
                    config.jobs = *jobs;
                }
                config.fail_fast |= *fail_fast;
                config.use_cache &= !*no_cache;
                config.sanity_checks &= !*no_sanity_checks;

                let loaded = self.load(plan)?;
                let engine = Engine::open(&config, &self.problem_root)
                    .context("failed to open the artifact store")?;
                let runtime =
                    tokio::runtime::Runtime::new().context("failed to create async runtime")?;
                let result = runtime.block_on(engine.execute(&loaded));
                let report = Report::assemble(&loaded.tree, Some(&result));

                let export = if *no_export {
                    None
                } else {
                    let data_dir = config.data_path(&self.problem_root);
                    let summary = Exporter::new(engine.store(), &data_dir)
                        .with_prune(*prune)
                        .export(&report)?;
                    Some((summary, data_dir))
                };
                info!(
                    passed = report.summary.passed,
                    failed = report.summary.failed,
                    "Generate finished"
                );

                let text = match plan.format {
                    OutputFormat::Json => format_report_json(&report)?,
                    OutputFormat::Text => {
                        let mut text = format_report_text(&report);
                        if let Some((summary, data_dir)) = &export {
                            text.push_str("\n\n");
                            text.push_str(&format_export_summary(summary, data_dir));
                        }
                        text
                    }
                };
                Ok(CommandOutput {
                    text,
                    success: report.is_success(),
                })
            }
        }
    }

    fn load(&self, args: &PlanArgs) -> Result<LoadedPlan> {
        let path = match &args.plan {
            Some(path) => path.clone(),
            None => self.config.plan_path(&self.problem_root),
        };
        LoadedPlan::from_file(&path).with_context(|| format!("failed to load {}", path.display()))
    }
}

//! Engine facade: load, plan, execute and report in one place.
//!
//! CLI and other callers go through [`Engine`]; no loader, scheduler or executor
//! orchestration lives in adapters.

use crate::config::EngineConfig;
use crate::error::{EngineError, PlanError};
use crate::generation::{ExecutionResult, ExecutorSettings, GenerationExecutor, GenerationPlan};
use crate::plan::{load_plan, read_plan_file, CaseTree, PlanValue};
use crate::program::{ProcessRunner, ProgramCatalog, TokioProcessRunner};
use crate::report::Report;
use crate::store::{ArtifactStore, SledArtifactStore};
use crate::validation::ValidatorSet;
use std::path::Path;
use tracing::{info, instrument};

/// A resolved tree together with its execution schedule.
#[derive(Debug, Clone)]
pub struct LoadedPlan {
    pub tree: CaseTree,
    pub schedule: GenerationPlan,
}

impl LoadedPlan {
    /// Resolve the plan into a tree and schedule. Copy-graph problems are load errors.
    #[instrument(skip_all)]
    pub fn from_value(plan: &PlanValue) -> Result<Self, PlanError> {
        let tree = load_plan(plan)?;
        let schedule = GenerationPlan::build(&tree)?;
        info!(
            cases = schedule.total_cases,
            levels = schedule.total_levels,
            "Plan loaded"
        );
        Ok(Self { tree, schedule })
    }

    /// Read and resolve a plan file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let value = read_plan_file(path)?;
        Ok(Self::from_value(&value)?)
    }

    /// Report with every case still `Planned`.
    pub fn report(&self) -> Report {
        Report::assemble(&self.tree, None)
    }
}

pub struct Engine<R: ProcessRunner = TokioProcessRunner> {
    catalog: ProgramCatalog,
    validators: ValidatorSet,
    store: Box<dyn ArtifactStore>,
    runner: R,
    settings: ExecutorSettings,
}

impl Engine<TokioProcessRunner> {
    /// Engine for a problem directory backed by the persistent store.
    pub fn open(config: &EngineConfig, problem_root: &Path) -> Result<Self, EngineError> {
        let settings = config.executor_settings()?;
        let store = SledArtifactStore::new(config.store_dir(problem_root))?;
        Ok(Self::with_parts(
            problem_root,
            TokioProcessRunner,
            Box::new(store),
            settings,
        ))
    }
}

impl<R: ProcessRunner> Engine<R> {
    pub fn with_parts(
        problem_root: &Path,
        runner: R,
        store: Box<dyn ArtifactStore>,
        settings: ExecutorSettings,
    ) -> Self {
        let catalog = ProgramCatalog::new(problem_root);
        let validators = ValidatorSet::discover(&catalog);
        Self {
            catalog,
            validators,
            store,
            runner,
            settings,
        }
    }

    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn ArtifactStore {
        self.store.as_ref()
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn load(&self, plan: &PlanValue) -> Result<LoadedPlan, PlanError> {
        LoadedPlan::from_value(plan)
    }

    /// Execute a loaded plan and return the raw per-case outcomes.
    pub async fn execute(&self, loaded: &LoadedPlan) -> ExecutionResult {
        let executor = GenerationExecutor::new(
            &self.runner,
            &self.catalog,
            &self.validators,
            self.store.as_ref(),
            self.settings.clone(),
        );
        executor.execute(&loaded.tree, &loaded.schedule).await
    }

    /// Load, execute and assemble the report.
    pub async fn run(&self, plan: &PlanValue) -> Result<Report, EngineError> {
        let loaded = self.load(plan)?;
        let result = self.execute(&loaded).await;
        Ok(Report::assemble(&loaded.tree, Some(&result)))
    }
}

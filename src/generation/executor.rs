//! Generation executor: runs a generation plan level by level.
//!
//! Cases in one level run concurrently on a bounded pool; a level starts only
//! after the previous one finished, so copy sources are always resolved first.
//! Each case is generated, validated and stored independently of its siblings.

use crate::command::{CommandTemplate, Substitution};
use crate::error::{CaseError, GenerationError};
use crate::generation::cache::CacheKeyBuilder;
use crate::generation::plan::{FailurePolicy, GenerationPlan, LevelSummary};
use crate::plan::{Case, CaseSource, CaseTree};
use crate::program::{Invocation, ProcessRunner, ProgramCatalog, ProgramRole};
use crate::seed::content_fingerprint;
use crate::store::{ArtifactStore, Artifacts, CaseMetadata, CaseRecord};
use crate::types::CasePath;
use crate::validation::{Expectation, Stage, ValidationPipeline, ValidatorSet, Verdict};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Maximum number of cases in flight
    pub jobs: usize,
    pub generator_time_limit: Duration,
    pub solution_time_limit: Duration,
    pub visualizer_time_limit: Duration,
    pub validator_time_limit: Duration,
    pub failure_policy: FailurePolicy,
    /// Used when neither the case nor any enclosing group names a solution
    pub default_solution: Option<CommandTemplate>,
    pub sanity_checks: bool,
    /// Reuse stored artifacts whose cache key still matches
    pub use_cache: bool,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            jobs: 4,
            generator_time_limit: Duration::from_secs(30),
            solution_time_limit: Duration::from_secs(30),
            visualizer_time_limit: Duration::from_secs(30),
            validator_time_limit: Duration::from_secs(30),
            failure_policy: FailurePolicy::Continue,
            default_solution: None,
            sanity_checks: true,
            use_cache: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed { cached: bool },
    RejectedAsExpected { stage: Stage },
    Failed { error: CaseError },
    /// Not started because an earlier case failed under fail-fast
    Cancelled,
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(
            self,
            CaseOutcome::Passed { .. } | CaseOutcome::RejectedAsExpected { .. }
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub outcomes: BTreeMap<CasePath, CaseOutcome>,
    pub level_summaries: Vec<LevelSummary>,
    pub total_passed: usize,
    pub total_failed: usize,
    pub total_cancelled: usize,
}

impl ExecutionResult {
    pub fn outcome(&self, path: &CasePath) -> Option<&CaseOutcome> {
        self.outcomes.get(path)
    }

    pub fn is_success(&self) -> bool {
        self.total_failed == 0 && self.total_cancelled == 0
    }
}

/// Successful result of one case before it is recorded.
struct Resolved {
    artifacts: Artifacts,
    metadata: CaseMetadata,
    cache_key: Option<String>,
    verdict: Verdict,
    cached: bool,
}

/// What the case's source yields before any solution runs.
struct Prepared {
    input: Vec<u8>,
    answer: Option<Vec<u8>>,
    output: Option<Vec<u8>>,
    visualization: Option<Vec<u8>>,
    metadata: CaseMetadata,
    cache_key: Option<String>,
    cached: bool,
}

/// Executes a generation plan against the process runner and artifact store.
pub struct GenerationExecutor<'a, R: ProcessRunner> {
    runner: &'a R,
    catalog: &'a ProgramCatalog,
    validators: &'a ValidatorSet,
    store: &'a dyn ArtifactStore,
    settings: ExecutorSettings,
}

impl<'a, R: ProcessRunner> GenerationExecutor<'a, R> {
    pub fn new(
        runner: &'a R,
        catalog: &'a ProgramCatalog,
        validators: &'a ValidatorSet,
        store: &'a dyn ArtifactStore,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            runner,
            catalog,
            validators,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(cases = plan.total_cases, levels = plan.total_levels))]
    pub async fn execute(&self, tree: &CaseTree, plan: &GenerationPlan) -> ExecutionResult {
        let cases: HashMap<&CasePath, &Case> =
            tree.cases().into_iter().map(|case| (&case.path, case)).collect();
        let semaphore = Semaphore::new(self.settings.jobs.max(1));
        let resolved: Mutex<HashMap<CasePath, Artifacts>> = Mutex::new(HashMap::new());
        let aborted = AtomicBool::new(false);
        let mut result = ExecutionResult::default();

        info!("Generation started");
        for (level_index, level) in plan.levels.iter().enumerate() {
            debug!(level_index, total_count = level.len(), "Level started");
            let mut summary = LevelSummary {
                level_index,
                total_count: level.len(),
                ..LevelSummary::default()
            };

            let mut futures = FuturesUnordered::new();
            for path in level {
                let case = cases.get(path).copied();
                let semaphore = &semaphore;
                let resolved = &resolved;
                let aborted = &aborted;
                futures.push(async move {
                    let Some(case) = case else {
                        let error = GenerationError::MissingCopySource {
                            path: path.to_string(),
                            reference: path.to_string(),
                        };
                        return (path, CaseOutcome::Failed { error: error.into() });
                    };
                    let Ok(_permit) = semaphore.acquire().await else {
                        return (path, CaseOutcome::Cancelled);
                    };
                    if aborted.load(Ordering::SeqCst) {
                        return (path, CaseOutcome::Cancelled);
                    }
                    (path, self.run_case(case, resolved).await)
                });
            }

            while let Some((path, outcome)) = futures.next().await {
                match &outcome {
                    CaseOutcome::Passed { .. } | CaseOutcome::RejectedAsExpected { .. } => {
                        summary.passed_count += 1;
                    }
                    CaseOutcome::Failed { error } => {
                        summary.failed_count += 1;
                        warn!(case = %path, error = %error, "Case failed");
                        if self.settings.failure_policy == FailurePolicy::FailFast {
                            aborted.store(true, Ordering::SeqCst);
                        }
                    }
                    CaseOutcome::Cancelled => summary.cancelled_count += 1,
                }
                result.outcomes.insert(path.clone(), outcome);
            }

            result.total_passed += summary.passed_count;
            result.total_failed += summary.failed_count;
            result.total_cancelled += summary.cancelled_count;
            debug!(
                level_index,
                passed = summary.passed_count,
                failed = summary.failed_count,
                cancelled = summary.cancelled_count,
                "Level completed"
            );
            result.level_summaries.push(summary);
        }

        info!(
            passed = result.total_passed,
            failed = result.total_failed,
            cancelled = result.total_cancelled,
            "Generation completed"
        );
        result
    }

    async fn run_case(
        &self,
        case: &Case,
        resolved: &Mutex<HashMap<CasePath, Artifacts>>,
    ) -> CaseOutcome {
        match self.resolve_case(case, resolved).await {
            Ok(done) => {
                let record = CaseRecord {
                    path: case.path.clone(),
                    artifacts: done.artifacts.clone(),
                    metadata: done.metadata,
                    cache_key: done.cache_key,
                    stored_at: Utc::now(),
                };
                if let Err(err) = self.store.put(&record) {
                    let error = GenerationError::Store(err.to_string());
                    return CaseOutcome::Failed {
                        error: error.into(),
                    };
                }
                resolved.lock().insert(case.path.clone(), done.artifacts);
                debug!(case = %case.path, cached = done.cached, "Case resolved");
                match done.verdict {
                    Verdict::Valid => CaseOutcome::Passed {
                        cached: done.cached,
                    },
                    Verdict::RejectedAsExpected(stage) => CaseOutcome::RejectedAsExpected { stage },
                }
            }
            Err(error) => {
                if let Err(err) = self.store.remove(&case.path) {
                    warn!(case = %case.path, error = %err, "Failed to drop stale record");
                }
                CaseOutcome::Failed { error }
            }
        }
    }

    async fn resolve_case(
        &self,
        case: &Case,
        resolved: &Mutex<HashMap<CasePath, Artifacts>>,
    ) -> Result<Resolved, CaseError> {
        let prepared = self.prepare(case, resolved).await?;
        let declared_answer = prepared.answer.clone();
        let solution_runs = declared_answer.is_none();

        let pipeline = ValidationPipeline::new(
            self.runner,
            self.validators,
            self.settings.validator_time_limit,
            self.settings.sanity_checks,
        );
        let outcome = pipeline
            .run(
                &case.path,
                Expectation::for_path(&case.path),
                &prepared.input,
                prepared.output.as_deref(),
                || self.answer_for(case, &prepared.input, declared_answer),
            )
            .await?;

        let mut metadata = prepared.metadata;
        if solution_runs && outcome.answer.is_some() {
            metadata.solution = self.effective_solution(case).map(|s| s.raw().to_string());
        }

        let visualization = match (&prepared.visualization, &outcome.answer) {
            (Some(stored), _) => Some(stored.clone()),
            (None, Some(_)) if !prepared.cached => self.visualize(case, &prepared.input).await?,
            _ => None,
        };

        Ok(Resolved {
            artifacts: Artifacts {
                input: prepared.input,
                answer: outcome.answer.unwrap_or_default(),
                output: prepared.output,
                visualization,
            },
            metadata,
            cache_key: prepared.cache_key,
            verdict: outcome.verdict,
            cached: prepared.cached,
        })
    }

    /// Produce the input (and any declared answer/output) from the case's source.
    async fn prepare(
        &self,
        case: &Case,
        resolved: &Mutex<HashMap<CasePath, Artifacts>>,
    ) -> Result<Prepared, GenerationError> {
        match &case.source {
            CaseSource::Copied { reference } => {
                let source = resolved.lock().get(reference).cloned().ok_or_else(|| {
                    GenerationError::CopySourceFailed {
                        path: case.path.to_string(),
                        reference: reference.to_string(),
                    }
                })?;
                let mut metadata = CaseMetadata::new(case.kind());
                metadata.copied_from = Some(reference.clone());
                Ok(Prepared {
                    answer: non_empty(source.answer),
                    input: source.input,
                    output: source.output,
                    visualization: source.visualization,
                    metadata,
                    cache_key: None,
                    cached: false,
                })
            }
            CaseSource::Literal {
                input,
                answer,
                output,
            } => {
                let key = self
                    .base_key(case)
                    .field("input", &content_fingerprint(input.as_bytes()))
                    .optional(
                        "answer",
                        answer.as_ref().map(|a| content_fingerprint(a.as_bytes())).as_deref(),
                    )
                    .optional(
                        "output",
                        output.as_ref().map(|o| content_fingerprint(o.as_bytes())).as_deref(),
                    );
                let key = self.finish_key(case, key, answer.is_none());
                if let Some(hit) = self.cached(case, &key)? {
                    return Ok(hit);
                }
                Ok(Prepared {
                    input: input.as_bytes().to_vec(),
                    answer: answer.as_ref().map(|a| a.as_bytes().to_vec()),
                    output: output.as_ref().map(|o| o.as_bytes().to_vec()),
                    visualization: None,
                    metadata: CaseMetadata::new(case.kind()),
                    cache_key: Some(key),
                    cached: false,
                })
            }
            CaseSource::Generated {
                command,
                salt,
                seed,
            } => {
                let substitution = Substitution {
                    name: &case.name,
                    seed: Some(*seed),
                    count: case.count_index,
                };
                let (program, args) =
                    command
                        .argv(&substitution)
                        .map_err(|source| GenerationError::Command {
                            path: case.path.to_string(),
                            source,
                        })?;
                let program_path = self.catalog.resolve(&program, ProgramRole::Generator)?;
                let key = self
                    .base_key(case)
                    .field("command", command.raw())
                    .field("salt", salt)
                    .field("seed", &seed.to_string())
                    .field("generator", &self.catalog.fingerprint(&program_path)?);
                let key = self.finish_key(case, key, true);
                if let Some(hit) = self.cached(case, &key)? {
                    return Ok(hit);
                }

                debug!(case = %case.path, program = %program, seed = %seed, "Running generator");
                let invocation =
                    Invocation::new(program, program_path, self.settings.generator_time_limit)
                        .with_args(args)
                        .with_cwd(self.catalog.root().to_path_buf());
                let input = self.runner.run(&invocation).await?.into_stdout(&invocation)?;
                Ok(Prepared {
                    input,
                    answer: None,
                    output: None,
                    visualization: None,
                    metadata: CaseMetadata {
                        seed: Some(*seed),
                        raw_command: Some(command.raw().to_string()),
                        salt: Some(salt.clone()),
                        ..CaseMetadata::new(case.kind())
                    },
                    cache_key: Some(key),
                    cached: false,
                })
            }
        }
    }

    fn base_key(&self, case: &Case) -> CacheKeyBuilder {
        CacheKeyBuilder::new()
            .field("path", case.path.as_str())
            .field("kind", &case.kind().to_string())
            .field("count", &case.count_index.to_string())
    }

    /// Add the solution (when it would run) and visualizer identities.
    fn finish_key(&self, case: &Case, key: CacheKeyBuilder, needs_solution: bool) -> String {
        let solution = if needs_solution {
            self.effective_solution(case)
        } else {
            None
        };
        let key = self.program_identity(key, "solution", solution, ProgramRole::Solution);
        self.program_identity(
            key,
            "visualizer",
            case.visualizer.as_ref(),
            ProgramRole::Visualizer,
        )
        .finish()
    }

    fn program_identity(
        &self,
        key: CacheKeyBuilder,
        label: &str,
        template: Option<&CommandTemplate>,
        role: ProgramRole,
    ) -> CacheKeyBuilder {
        let fingerprint = template.and_then(|template| {
            self.catalog
                .resolve(template.program(), role)
                .and_then(|path| self.catalog.fingerprint(&path))
                .ok()
        });
        key.optional(label, template.map(CommandTemplate::raw))
            .optional(&format!("{}-content", label), fingerprint.as_deref())
    }

    /// Stored artifacts for the case if its cache key still matches.
    fn cached(&self, case: &Case, key: &str) -> Result<Option<Prepared>, GenerationError> {
        if !self.settings.use_cache {
            return Ok(None);
        }
        let record = self
            .store
            .get(&case.path)
            .map_err(|err| GenerationError::Store(err.to_string()))?;
        match record {
            Some(record) if record.cache_key.as_deref() == Some(key) => {
                debug!(case = %case.path, "Cache hit");
                Ok(Some(Prepared {
                    answer: non_empty(record.artifacts.answer),
                    input: record.artifacts.input,
                    output: record.artifacts.output,
                    visualization: record.artifacts.visualization,
                    metadata: record.metadata,
                    cache_key: record.cache_key,
                    cached: true,
                }))
            }
            _ => Ok(None),
        }
    }

    fn effective_solution<'c>(&'c self, case: &'c Case) -> Option<&'c CommandTemplate> {
        case.solution
            .as_ref()
            .or(self.settings.default_solution.as_ref())
    }

    /// Declared answer, or the solution's output on the input.
    async fn answer_for(
        &self,
        case: &Case,
        input: &[u8],
        declared: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, GenerationError> {
        if let Some(answer) = declared {
            return Ok(answer);
        }
        let solution = self
            .effective_solution(case)
            .ok_or_else(|| GenerationError::NoSolution {
                path: case.path.to_string(),
            })?;
        let substitution = Substitution {
            name: &case.name,
            seed: case.seed(),
            count: case.count_index,
        };
        let (program, args) =
            solution
                .argv(&substitution)
                .map_err(|source| GenerationError::Command {
                    path: case.path.to_string(),
                    source,
                })?;
        let program_path = self.catalog.resolve(&program, ProgramRole::Solution)?;
        debug!(case = %case.path, solution = %program, "Running solution");
        let invocation = Invocation::new(program, program_path, self.settings.solution_time_limit)
            .with_args(args)
            .with_stdin(input.to_vec())
            .with_cwd(self.catalog.root().to_path_buf());
        self.runner.run(&invocation).await?.into_stdout(&invocation)
    }

    async fn visualize(&self, case: &Case, input: &[u8]) -> Result<Option<Vec<u8>>, GenerationError> {
        let Some(visualizer) = &case.visualizer else {
            return Ok(None);
        };
        let substitution = Substitution {
            name: &case.name,
            seed: case.seed(),
            count: case.count_index,
        };
        let (program, args) =
            visualizer
                .argv(&substitution)
                .map_err(|source| GenerationError::Command {
                    path: case.path.to_string(),
                    source,
                })?;
        let program_path = self.catalog.resolve(&program, ProgramRole::Visualizer)?;
        let invocation = Invocation::new(program, program_path, self.settings.visualizer_time_limit)
            .with_args(args)
            .with_stdin(input.to_vec())
            .with_cwd(self.catalog.root().to_path_buf());
        let image = self.runner.run(&invocation).await?.into_stdout(&invocation)?;
        Ok(Some(image))
    }
}

fn non_empty(bytes: Vec<u8>) -> Option<Vec<u8>> {
    (!bytes.is_empty()).then_some(bytes)
}

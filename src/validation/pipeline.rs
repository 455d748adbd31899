//! Per-case stage sequence: input checks, solution, answer checks, output checks.

use crate::error::{CaseError, GenerationError};
use crate::program::{Invocation, ProcessRunner};
use crate::types::CasePath;
use crate::validation::sanity::{check_text, tokens_match};
use crate::validation::validators::{
    interpret, validator_name, Rejection, StageVerdict, ValidatorSet,
};
use crate::validation::{Expectation, Stage, Verdict};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::debug;

const SANITY_CHECK: &str = "sanity check";
const DEFAULT_CHECKER: &str = "default checker";

/// Result of a case that passed validation (possibly by being rejected as expected)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// `None` when validation settled before an answer was needed
    pub answer: Option<Vec<u8>>,
    pub verdict: Verdict,
}

pub struct ValidationPipeline<'a, R: ProcessRunner> {
    runner: &'a R,
    validators: &'a ValidatorSet,
    time_limit: Duration,
    sanity_checks: bool,
}

/// Case files on disk, for validators that take paths.
struct CaseFiles {
    dir: TempDir,
    input: PathBuf,
    answer: PathBuf,
}

impl CaseFiles {
    async fn new(input: &[u8]) -> Result<Self, GenerationError> {
        let dir = tokio::task::spawn_blocking(|| {
            tempfile::Builder::new().prefix("casegen-").tempdir()
        })
        .await
        .map_err(|err| GenerationError::Workspace(err.to_string()))?
        .map_err(|err| GenerationError::Workspace(err.to_string()))?;
        let input_path = dir.path().join("testcase.in");
        tokio::fs::write(&input_path, input)
            .await
            .map_err(|err| GenerationError::Workspace(err.to_string()))?;
        let answer = dir.path().join("testcase.ans");
        Ok(Self {
            dir,
            input: input_path,
            answer,
        })
    }

    async fn write_answer(&self, answer: &[u8]) -> Result<(), GenerationError> {
        tokio::fs::write(&self.answer, answer)
            .await
            .map_err(|err| GenerationError::Workspace(err.to_string()))
    }

    async fn feedback_dir(&self, index: usize) -> Result<PathBuf, GenerationError> {
        let path = self.dir.path().join(format!("feedback-{}", index));
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|err| GenerationError::Workspace(err.to_string()))?;
        Ok(path)
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl<'a, R: ProcessRunner> ValidationPipeline<'a, R> {
    pub fn new(
        runner: &'a R,
        validators: &'a ValidatorSet,
        time_limit: Duration,
        sanity_checks: bool,
    ) -> Self {
        Self {
            runner,
            validators,
            time_limit,
            sanity_checks,
        }
    }

    /// Validate one case. `answer` is only awaited once the input has been
    /// accepted and the expectation still needs an answer.
    pub async fn run<F, Fut>(
        &self,
        path: &CasePath,
        expectation: Expectation,
        input: &[u8],
        output: Option<&[u8]>,
        answer: F,
    ) -> Result<PipelineOutcome, CaseError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, GenerationError>>,
    {
        let files = CaseFiles::new(input).await?;

        if let StageVerdict::Rejected(rejection) = self.check_input(&files, input).await? {
            return self.settle(path, expectation, Some(rejection), None);
        }
        if expectation.settled_after(Stage::Input) {
            return self.settle(path, expectation, None, None);
        }

        let answer = answer().await?;
        files.write_answer(&answer).await?;
        if let StageVerdict::Rejected(rejection) = self.check_answer(&files, &answer).await? {
            return self.settle(path, expectation, Some(rejection), Some(answer));
        }
        if expectation.settled_after(Stage::Answer) {
            return self.settle(path, expectation, None, Some(answer));
        }

        if let Some(output) = output {
            if let StageVerdict::Rejected(rejection) =
                self.check_output(&files, &answer, output).await?
            {
                return self.settle(path, expectation, Some(rejection), Some(answer));
            }
        }
        self.settle(path, expectation, None, Some(answer))
    }

    fn settle(
        &self,
        path: &CasePath,
        expectation: Expectation,
        rejection: Option<Rejection>,
        answer: Option<Vec<u8>>,
    ) -> Result<PipelineOutcome, CaseError> {
        if let Some(rejection) = &rejection {
            debug!(
                case = %path,
                stage = %rejection.stage,
                validator = %rejection.validator,
                "Validation rejected"
            );
        }
        let verdict = expectation.judge(rejection)?;
        Ok(PipelineOutcome { answer, verdict })
    }

    async fn check_input(
        &self,
        files: &CaseFiles,
        input: &[u8],
    ) -> Result<StageVerdict, GenerationError> {
        if let Some(verdict) = self.sanity(Stage::Input, input) {
            return Ok(verdict);
        }
        for program in &self.validators.input {
            let invocation = self.invocation(program, files).with_stdin(input.to_vec());
            let output = self.runner.run(&invocation).await?;
            let verdict = interpret(Stage::Input, &invocation, &output, None)?;
            if verdict != StageVerdict::Accepted {
                return Ok(verdict);
            }
        }
        Ok(StageVerdict::Accepted)
    }

    async fn check_answer(
        &self,
        files: &CaseFiles,
        answer: &[u8],
    ) -> Result<StageVerdict, GenerationError> {
        if let Some(verdict) = self.sanity(Stage::Answer, answer) {
            return Ok(verdict);
        }
        for program in &self.validators.answer {
            let invocation = self
                .invocation(program, files)
                .with_args(vec![path_arg(&files.input)])
                .with_stdin(answer.to_vec());
            let output = self.runner.run(&invocation).await?;
            let verdict = interpret(Stage::Answer, &invocation, &output, None)?;
            if verdict != StageVerdict::Accepted {
                return Ok(verdict);
            }
        }
        Ok(StageVerdict::Accepted)
    }

    async fn check_output(
        &self,
        files: &CaseFiles,
        answer: &[u8],
        output: &[u8],
    ) -> Result<StageVerdict, GenerationError> {
        if self.validators.output.is_empty() {
            return Ok(match tokens_match(answer, output) {
                Ok(()) => StageVerdict::Accepted,
                Err(diagnostic) => StageVerdict::Rejected(Rejection {
                    stage: Stage::Output,
                    validator: DEFAULT_CHECKER.to_string(),
                    diagnostic,
                }),
            });
        }
        for (index, program) in self.validators.output.iter().enumerate() {
            let feedback = files.feedback_dir(index).await?;
            let invocation = self
                .invocation(program, files)
                .with_args(vec![
                    path_arg(&files.input),
                    path_arg(&files.answer),
                    path_arg(&feedback),
                ])
                .with_stdin(output.to_vec());
            let run = self.runner.run(&invocation).await?;
            let verdict = interpret(Stage::Output, &invocation, &run, Some(&feedback))?;
            if verdict != StageVerdict::Accepted {
                return Ok(verdict);
            }
        }
        Ok(StageVerdict::Accepted)
    }

    fn sanity(&self, stage: Stage, bytes: &[u8]) -> Option<StageVerdict> {
        if !self.sanity_checks {
            return None;
        }
        check_text(bytes).err().map(|diagnostic| {
            StageVerdict::Rejected(Rejection {
                stage,
                validator: SANITY_CHECK.to_string(),
                diagnostic,
            })
        })
    }

    fn invocation(&self, program: &Path, files: &CaseFiles) -> Invocation {
        Invocation::new(validator_name(program), program.to_path_buf(), self.time_limit)
            .with_cwd(files.root().to_path_buf())
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

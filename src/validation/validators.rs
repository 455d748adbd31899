//! Validator programs and how their results are read.
//!
//! Validators follow the usual problem-package convention: exit code 42 accepts,
//! 43 rejects. Any other exit is a rejection as well, reported with its status.
//! A validator that runs out of time is a generation failure, not a verdict.

use crate::error::GenerationError;
use crate::program::{ExitState, Invocation, ProgramCatalog, RunOutput};
use crate::validation::Stage;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ACCEPT_EXIT_CODE: i32 = 42;
pub const REJECT_EXIT_CODE: i32 = 43;

/// First rejection of a case, with the check that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub stage: Stage,
    pub validator: String,
    pub diagnostic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageVerdict {
    Accepted,
    Rejected(Rejection),
}

/// Validator programs of a problem, per stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorSet {
    pub input: Vec<PathBuf>,
    pub answer: Vec<PathBuf>,
    pub output: Vec<PathBuf>,
}

impl ValidatorSet {
    pub fn discover(catalog: &ProgramCatalog) -> Self {
        let set = Self {
            input: catalog.programs_in(Stage::Input.validator_dir()),
            answer: catalog.programs_in(Stage::Answer.validator_dir()),
            output: catalog.programs_in(Stage::Output.validator_dir()),
        };
        debug!(
            input = set.input.len(),
            answer = set.answer.len(),
            output = set.output.len(),
            "Validators discovered"
        );
        set
    }

    pub fn for_stage(&self, stage: Stage) -> &[PathBuf] {
        match stage {
            Stage::Input => &self.input,
            Stage::Answer => &self.answer,
            Stage::Output => &self.output,
        }
    }
}

pub fn validator_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Turn a finished validator run into a verdict.
///
/// The diagnostic is the validator's `judgemessage.txt` when it wrote one,
/// otherwise its stderr.
pub fn interpret(
    stage: Stage,
    invocation: &Invocation,
    output: &RunOutput,
    feedback_dir: Option<&Path>,
) -> Result<StageVerdict, GenerationError> {
    let rejected = |diagnostic: String| {
        StageVerdict::Rejected(Rejection {
            stage,
            validator: invocation.name.clone(),
            diagnostic,
        })
    };
    let message = || {
        feedback_dir
            .and_then(|dir| std::fs::read_to_string(dir.join("judgemessage.txt")).ok())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| output.stderr_text())
    };

    match output.status {
        ExitState::Exited(ACCEPT_EXIT_CODE) => Ok(StageVerdict::Accepted),
        ExitState::Exited(REJECT_EXIT_CODE) => Ok(rejected(message())),
        ExitState::Exited(code) => Ok(rejected(format!(
            "exited with status {}: {}",
            code,
            message()
        ))),
        ExitState::Signaled => Ok(rejected(format!("killed by a signal: {}", message()))),
        ExitState::TimedOut => Err(GenerationError::Timeout {
            program: invocation.name.clone(),
            limit: invocation.time_limit,
        }),
    }
}

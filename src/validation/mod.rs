//! Validation of generated testcases.
//!
//! Every case goes through the input stage, then the answer stage, then (when an
//! output artifact exists) the output stage. Cases under the top-level groups
//! `invalid_input`, `invalid_answer`, `invalid_output` and `bad` are fixtures that
//! must be rejected, and an expected rejection counts as a pass.

pub mod pipeline;
pub mod sanity;
pub mod validators;

pub use pipeline::{PipelineOutcome, ValidationPipeline};
pub use sanity::{check_text, tokens_match};
pub use validators::{Rejection, StageVerdict, ValidatorSet};

use crate::error::ValidationError;
use crate::types::CasePath;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Input,
    Answer,
    Output,
}

impl Stage {
    pub fn validator_dir(self) -> &'static str {
        match self {
            Stage::Input => "input_validators",
            Stage::Answer => "answer_validators",
            Stage::Output => "output_validators",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "input"),
            Stage::Answer => write!(f, "answer"),
            Stage::Output => write!(f, "output"),
        }
    }
}

/// What the validators are expected to say about a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Valid,
    /// Earlier stages accept, this stage rejects
    RejectAt(Stage),
    /// Some stage rejects
    RejectAny,
}

impl Expectation {
    pub fn for_path(path: &CasePath) -> Self {
        match path.first_segment() {
            Some("invalid_input") => Expectation::RejectAt(Stage::Input),
            Some("invalid_answer") => Expectation::RejectAt(Stage::Answer),
            Some("invalid_output") => Expectation::RejectAt(Stage::Output),
            Some("bad") => Expectation::RejectAny,
            _ => Expectation::Valid,
        }
    }

    /// Whether validation can stop once `stage` has accepted.
    pub fn settled_after(self, stage: Stage) -> bool {
        self == Expectation::RejectAt(stage)
    }

    /// Final verdict given the first rejection, if any stage rejected.
    pub fn judge(self, rejection: Option<Rejection>) -> Result<Verdict, ValidationError> {
        match (self, rejection) {
            (Expectation::Valid, None) => Ok(Verdict::Valid),
            (Expectation::Valid, Some(rejection)) => Err(ValidationError::Rejected {
                stage: rejection.stage,
                validator: rejection.validator,
                diagnostic: rejection.diagnostic,
            }),
            (Expectation::RejectAt(expected), Some(rejection)) if rejection.stage == expected => {
                Ok(Verdict::RejectedAsExpected(expected))
            }
            (Expectation::RejectAt(expected), Some(rejection)) => {
                Err(ValidationError::WrongStage {
                    expected,
                    actual: rejection.stage,
                    diagnostic: rejection.diagnostic,
                })
            }
            (Expectation::RejectAt(expected), None) => Err(ValidationError::UnexpectedlyAccepted {
                expected: Some(expected),
            }),
            (Expectation::RejectAny, Some(rejection)) => {
                Ok(Verdict::RejectedAsExpected(rejection.stage))
            }
            (Expectation::RejectAny, None) => {
                Err(ValidationError::UnexpectedlyAccepted { expected: None })
            }
        }
    }
}

/// Passing outcome of validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    RejectedAsExpected(Stage),
}

//! Error types for the testcase generation engine.
//!
//! Structural errors (schema, naming, tokenizing, copy graph) abort a load before any
//! program runs. Generation and validation errors are per testcase and end up in the
//! report next to their case.

use crate::validation::Stage;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Malformed plan shape or reserved-key violation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{path}: unknown key '{key}'")]
    UnknownKey { path: String, key: String },

    #[error("{path}: key '{key}' is not allowed here ({reason})")]
    MisplacedKey {
        path: String,
        key: String,
        reason: &'static str,
    },

    #[error("{path}: expected {expected}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: testcase declares more than one source ({kinds})")]
    ConflictingSources { path: String, kinds: String },

    #[error("{path}: testcase declares no source (one of generate, copy, in)")]
    MissingSource { path: String },

    #[error("{path}: invalid count '{value}' (expected a positive integer)")]
    InvalidCount { path: String, value: String },

    #[error("{path}: command '{command}' uses {{seed}} more than once")]
    RepeatedSeed { path: String, command: String },

    #[error("{path}: '{key}' must not be empty")]
    EmptyValue { path: String, key: String },
}

/// Duplicate or unusable resolved names
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error("group {group}: name '{name}' is used more than once")]
    Duplicate { group: String, name: String },

    #[error("group {group}: '{name}' is not a valid testcase or group name")]
    InvalidName { group: String, name: String },

    #[error("group {group}: '{name}' and '{other}' both claim ordinal {ordinal}")]
    AmbiguousOrdinal {
        group: String,
        name: String,
        other: String,
        ordinal: u64,
    },
}

/// Malformed command string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("unterminated {quote} quote starting at byte {position}")]
    UnterminatedQuote { quote: char, position: usize },

    #[error("command ends with an unfinished escape")]
    TrailingEscape,

    #[error("command is empty")]
    Empty,
}

/// Process failures, timeouts and copy-reference problems
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{path}: copy source '{reference}' does not name a testcase")]
    MissingCopySource { path: String, reference: String },

    #[error("copy references form a cycle: {}", cycle.join(" -> "))]
    CopyCycle { cycle: Vec<String> },

    #[error("{path}: copy source '{reference}' did not resolve")]
    CopySourceFailed { path: String, reference: String },

    #[error("program '{name}' not found at {}", path.display())]
    ProgramNotFound { name: String, path: PathBuf },

    #[error("program '{name}' must be given relative to the generators directory")]
    AbsoluteProgram { name: String },

    #[error("failed to run '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("'{program}' exceeded its time limit of {}ms", limit.as_millis())]
    Timeout { program: String, limit: Duration },

    #[error("'{program}' exited with {}: {stderr}", describe_exit(*code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{path}: no answer declared and no solution available")]
    NoSolution { path: String },

    #[error("{path}: command rejected after substitution: {source}")]
    Command {
        path: String,
        #[source]
        source: TokenizeError,
    },

    #[error("artifact store failure: {0}")]
    Store(String),

    #[error("failed to prepare validation files: {0}")]
    Workspace(String),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Format or correctness rejection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{stage} rejected by {validator}: {diagnostic}")]
    Rejected {
        stage: Stage,
        validator: String,
        diagnostic: String,
    },

    #[error("expected rejection at {} stage, but every check accepted", expected_label(*expected))]
    UnexpectedlyAccepted { expected: Option<Stage> },

    #[error("expected rejection at {expected} stage, but {actual} stage rejected: {diagnostic}")]
    WrongStage {
        expected: Stage,
        actual: Stage,
        diagnostic: String,
    },
}

fn expected_label(stage: Option<Stage>) -> String {
    match stage {
        Some(stage) => stage.to_string(),
        None => "any".to_string(),
    }
}

/// Per-testcase failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Structural failure while loading a plan; no tree is produced
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("tokenize error at {path}: {source}")]
    Tokenize {
        path: String,
        #[source]
        source: TokenizeError,
    },

    #[error("copy graph error: {0}")]
    CopyGraph(#[from] GenerationError),
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Corrupt record for {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Engine facade errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Program catalog error: {0}")]
    Catalog(#[from] GenerationError),

    #[error("Plan file error: {0}")]
    PlanFile(String),

    #[error("Export failed for {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

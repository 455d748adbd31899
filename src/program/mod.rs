//! External programs: lookup, fingerprinting and execution.

pub mod catalog;
pub mod runner;

pub use catalog::{ProgramCatalog, ProgramRole, GENERATORS_DIR};
pub use runner::{ExitState, Invocation, ProcessRunner, RunOutput, TokioProcessRunner};

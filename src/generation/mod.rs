//! Testcase generation: scheduling, cache keys and the executor.

pub mod cache;
pub mod executor;
pub mod plan;

pub use cache::CacheKeyBuilder;
pub use executor::{CaseOutcome, ExecutionResult, ExecutorSettings, GenerationExecutor};
pub use plan::{FailurePolicy, GenerationPlan, LevelSummary};

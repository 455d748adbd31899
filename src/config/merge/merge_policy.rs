//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key: defaults, the global file, the
/// problem file, the environment-specific problem file, then `CASEGEN__*` variables.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = Config::builder()
        .set_default("jobs", super::super::default_jobs() as u64)?
        .set_default("generator_timeout_secs", 30u64)?
        .set_default("solution_timeout_secs", 30u64)?
        .set_default("visualizer_timeout_secs", 30u64)?
        .set_default("validator_timeout_secs", 30u64)?
        .set_default("fail_fast", false)?
        .set_default("sanity_checks", true)?
        .set_default("use_cache", true)?
        .set_default("store_path", ".casegen/store")?
        .set_default("plan_file", "generators/generators.yaml")?
        .set_default("data_dir", "data")?;
    Ok(builder)
}

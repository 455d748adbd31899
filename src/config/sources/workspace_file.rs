//! Problem config file source: casegen.toml and casegen.{env}.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

pub const PROBLEM_CONFIG_FILE: &str = "casegen.toml";
pub const ENV_NAME_ENV: &str = "CASEGEN_ENV";

/// Add problem config files to builder.
/// Precedence: casegen.toml (base) then casegen.{CASEGEN_ENV}.toml when the variable is set.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    problem_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder;

    let base_config_path = problem_root.join(PROBLEM_CONFIG_FILE);
    if base_config_path.is_file() {
        builder = builder.add_source(File::from(base_config_path.as_path()).required(false));
    }

    if let Ok(env_name) = std::env::var(ENV_NAME_ENV) {
        let env_config_path = problem_root.join(format!("casegen.{}.toml", env_name));
        if env_config_path.is_file() {
            builder = builder.add_source(File::from(env_config_path.as_path()).required(false));
        }
    }

    Ok(builder)
}

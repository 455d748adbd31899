//! Global config file source: $XDG_CONFIG_HOME/casegen/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::BaseDirs;
use std::path::PathBuf;
use tracing::debug;

/// Overrides the directory holding the global `config.toml`.
pub const CONFIG_HOME_ENV: &str = "CASEGEN_CONFIG_HOME";

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_HOME_ENV) {
        return Some(PathBuf::from(dir).join("config.toml"));
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().join("casegen").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.is_file() {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        } else {
            debug!(config_path = %path.display(), "No global configuration file");
        }
    }
    Ok(builder)
}

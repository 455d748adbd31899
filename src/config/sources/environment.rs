//! Environment source: CASEGEN__JOBS, CASEGEN__LOGGING__LEVEL, ...

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("CASEGEN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}

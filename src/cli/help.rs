//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log spans (e.g. "generate", "show").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Generate { .. } => "generate",
        Commands::Check { .. } => "check",
        Commands::Show { .. } => "show",
    }
}

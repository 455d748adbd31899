//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to the engine.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat, PlanArgs};
pub use presentation::{
    format_check_text, format_export_summary, format_report_json, format_report_text,
    format_summary_line, format_tree_text,
};
pub use route::{CommandOutput, RunContext};

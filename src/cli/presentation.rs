//! CLI presentation: text and json formatters per command.

mod report;
mod shared;

pub use report::{format_report_json, format_report_text, format_tree_text};
pub use shared::{format_check_text, format_export_summary, format_summary_line};

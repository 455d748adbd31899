//! Shared presentation: summary lines for check, generate and export.

use crate::engine::LoadedPlan;
use crate::export::ExportSummary;
use crate::report::ReportSummary;
use owo_colors::OwoColorize;

pub fn format_summary_line(summary: &ReportSummary, success: bool) -> String {
    let counts = format!(
        "{} cases: {} passed ({} cached), {} rejected as expected, {} failed, {} cancelled",
        summary.total,
        summary.passed,
        summary.cached,
        summary.rejected_as_expected,
        summary.failed,
        summary.cancelled
    );
    if success {
        format!("{} {}", "OK".green().bold(), counts)
    } else {
        format!("{} {}", "FAILED".red().bold(), counts)
    }
}

pub fn format_check_text(loaded: &LoadedPlan) -> String {
    format!(
        "{} Plan is valid: {} cases in {} levels",
        "OK".green().bold(),
        loaded.schedule.total_cases,
        loaded.schedule.total_levels
    )
}

pub fn format_export_summary(summary: &ExportSummary, data_dir: &std::path::Path) -> String {
    let mut s = format!(
        "Exported to {}: {} written, {} unchanged",
        data_dir.display(),
        summary.written,
        summary.unchanged
    );
    if summary.removed > 0 {
        s.push_str(&format!(", {} removed", summary.removed));
    }
    if !summary.missing.is_empty() {
        s.push_str(&format!(
            "\n{} {} cases had no stored artifacts",
            "warning:".yellow(),
            summary.missing.len()
        ));
    }
    s
}

//! Report presentation: per-case status tables and the resolved tree.

use crate::cli::presentation::shared::format_summary_line;
use crate::report::{CaseReport, CaseStatus, Report};
use comfy_table::{Cell, Color, Table};

pub fn format_report_json(report: &Report) -> serde_json::Result<String> {
    report.to_json()
}

/// Status table followed by the summary line and failure details.
pub fn format_report_text(report: &Report) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Case", "Kind", "Seed", "Status"]);
    for case in report.cases() {
        table.add_row(vec![
            Cell::new(case.path.as_str()),
            Cell::new(case.kind.to_string()),
            Cell::new(seed_text(case)),
            status_cell(&case.status),
        ]);
    }

    let mut out = table.to_string();
    out.push('\n');
    out.push_str(&format_summary_line(&report.summary, report.is_success()));

    let failures = report.failures();
    if !failures.is_empty() {
        out.push_str(&format!("\n\nFailures ({}):", failures.len()));
        for case in failures {
            match &case.status {
                CaseStatus::Failed { error, .. } => {
                    out.push_str(&format!("\n  - {}: {}", case.path, error));
                }
                _ => out.push_str(&format!("\n  - {}: {}", case.path, case.status.label())),
            }
        }
    }
    out
}

/// Indented tree of groups and cases with kinds and seeds.
pub fn format_tree_text(report: &Report) -> String {
    let tree = report.render_tree();
    if tree.is_empty() {
        return "Plan contains no cases.".to_string();
    }
    format!("{}{} cases", tree, report.summary.total)
}

fn seed_text(case: &CaseReport) -> String {
    case.seed
        .map(|seed| seed.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_cell(status: &CaseStatus) -> Cell {
    let color = match status {
        CaseStatus::Passed { cached: false } => Color::Green,
        CaseStatus::Passed { cached: true } => Color::DarkGreen,
        CaseStatus::RejectedAsExpected { .. } => Color::Cyan,
        CaseStatus::Failed { .. } => Color::Red,
        CaseStatus::Cancelled => Color::Yellow,
        CaseStatus::Planned => Color::Grey,
    };
    let label = match status {
        CaseStatus::RejectedAsExpected { stage } => format!("rejected at {} (expected)", stage),
        CaseStatus::Failed {
            stage: Some(stage), ..
        } => format!("failed at {}", stage),
        other => other.label().to_string(),
    };
    Cell::new(label).fg(color)
}

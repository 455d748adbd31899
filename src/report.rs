//! Group tree assembly and the status report.
//!
//! The report mirrors the resolved tree: groups keep their declaration order and
//! every case carries its kind, seed and final status.

use crate::error::{CaseError, ValidationError};
use crate::generation::{CaseOutcome, ExecutionResult};
use crate::plan::{Case, CaseTree, Entry, Group, SourceKind};
use crate::types::{CasePath, Seed};
use crate::validation::Stage;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    Passed {
        cached: bool,
    },
    RejectedAsExpected {
        stage: Stage,
    },
    Failed {
        /// Stage of a validation failure; absent for generation failures
        stage: Option<Stage>,
        error: String,
    },
    Cancelled,
    /// Planned only; nothing was executed
    Planned,
}

impl CaseStatus {
    fn from_outcome(outcome: &CaseOutcome) -> Self {
        match outcome {
            CaseOutcome::Passed { cached } => CaseStatus::Passed { cached: *cached },
            CaseOutcome::RejectedAsExpected { stage } => {
                CaseStatus::RejectedAsExpected { stage: *stage }
            }
            CaseOutcome::Failed { error } => CaseStatus::Failed {
                stage: failure_stage(error),
                error: error.to_string(),
            },
            CaseOutcome::Cancelled => CaseStatus::Cancelled,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Passed { cached: true } => "cached",
            CaseStatus::Passed { cached: false } => "passed",
            CaseStatus::RejectedAsExpected { .. } => "rejected (expected)",
            CaseStatus::Failed { .. } => "failed",
            CaseStatus::Cancelled => "cancelled",
            CaseStatus::Planned => "planned",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseStatus::Failed { .. } | CaseStatus::Cancelled)
    }
}

fn failure_stage(error: &CaseError) -> Option<Stage> {
    match error {
        CaseError::Validation(ValidationError::Rejected { stage, .. }) => Some(*stage),
        CaseError::Validation(ValidationError::WrongStage { actual, .. }) => Some(*actual),
        CaseError::Validation(ValidationError::UnexpectedlyAccepted { expected }) => *expected,
        CaseError::Generation(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub path: CasePath,
    pub kind: SourceKind,
    pub seed: Option<Seed>,
    /// Raw generator command, for generated cases
    pub command: Option<String>,
    #[serde(flatten)]
    pub status: CaseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub path: CasePath,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportEntry {
    Case(CaseReport),
    Group(GroupReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub cached: usize,
    pub rejected_as_expected: usize,
    pub failed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub root: GroupReport,
    pub summary: ReportSummary,
}

impl Report {
    /// Compose the final tree. Without an execution result every case is `Planned`.
    pub fn assemble(tree: &CaseTree, result: Option<&ExecutionResult>) -> Self {
        let root = assemble_group(&tree.root, result);
        let mut summary = ReportSummary::default();
        for case in flatten(&root) {
            summary.total += 1;
            match &case.status {
                CaseStatus::Passed { cached } => {
                    summary.passed += 1;
                    if *cached {
                        summary.cached += 1;
                    }
                }
                CaseStatus::RejectedAsExpected { .. } => summary.rejected_as_expected += 1,
                CaseStatus::Failed { .. } => summary.failed += 1,
                CaseStatus::Cancelled => summary.cancelled += 1,
                CaseStatus::Planned => {}
            }
        }
        Self {
            generated_at: Utc::now(),
            root,
            summary,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.failed == 0 && self.summary.cancelled == 0
    }

    /// Cases in declaration order.
    pub fn cases(&self) -> Vec<&CaseReport> {
        flatten(&self.root)
    }

    pub fn failures(&self) -> Vec<&CaseReport> {
        self.cases()
            .into_iter()
            .filter(|case| case.status.is_failure())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Indented tree listing, one line per group and case.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        render_group(&self.root, 0, &mut out);
        out
    }
}

fn assemble_group(group: &Group, result: Option<&ExecutionResult>) -> GroupReport {
    GroupReport {
        name: group.name.clone(),
        path: group.path.clone(),
        entries: group
            .entries
            .iter()
            .map(|entry| match entry {
                Entry::Case(case) => ReportEntry::Case(assemble_case(case, result)),
                Entry::Group(child) => ReportEntry::Group(assemble_group(child, result)),
            })
            .collect(),
    }
}

fn assemble_case(case: &Case, result: Option<&ExecutionResult>) -> CaseReport {
    let status = match result {
        None => CaseStatus::Planned,
        Some(result) => result
            .outcome(&case.path)
            .map(CaseStatus::from_outcome)
            .unwrap_or(CaseStatus::Cancelled),
    };
    let command = match &case.source {
        crate::plan::CaseSource::Generated { command, .. } => Some(command.raw().to_string()),
        _ => None,
    };
    CaseReport {
        name: case.name.clone(),
        path: case.path.clone(),
        kind: case.kind(),
        seed: case.seed(),
        command,
        status,
    }
}

fn flatten(group: &GroupReport) -> Vec<&CaseReport> {
    let mut out = Vec::new();
    collect(group, &mut out);
    out
}

fn collect<'a>(group: &'a GroupReport, out: &mut Vec<&'a CaseReport>) {
    for entry in &group.entries {
        match entry {
            ReportEntry::Case(case) => out.push(case),
            ReportEntry::Group(child) => collect(child, out),
        }
    }
}

fn render_group(group: &GroupReport, depth: usize, out: &mut String) {
    for entry in &group.entries {
        let indent = "  ".repeat(depth);
        match entry {
            ReportEntry::Group(child) => {
                out.push_str(&format!("{}{}/\n", indent, child.name));
                render_group(child, depth + 1, out);
            }
            ReportEntry::Case(case) => {
                let seed = case
                    .seed
                    .map(|seed| format!(" seed={}", seed))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{}{} [{}]{} {}\n",
                    indent,
                    case.name,
                    case.kind,
                    seed,
                    case.status.label()
                ));
            }
        }
    }
}

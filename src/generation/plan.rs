//! Scheduling: copy-dependency levels over the resolved tree.

use crate::error::GenerationError;
use crate::plan::{CaseSource, CaseTree};
use crate::types::CasePath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Every case runs; every failure is reported
    #[default]
    Continue,
    /// Cases not yet started after the first failure are cancelled
    FailFast,
}

/// Cases grouped into levels; every copy source lies in an earlier level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationPlan {
    pub levels: Vec<Vec<CasePath>>,
    pub total_cases: usize,
    pub total_levels: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl GenerationPlan {
    /// Check every copy reference and order cases by copy depth.
    ///
    /// A reference to a missing case (or to a group) and any cycle, including a
    /// case copying itself, are errors. Within a level, declaration order is kept.
    pub fn build(tree: &CaseTree) -> Result<Self, GenerationError> {
        let cases = tree.cases();
        let index: HashMap<&CasePath, usize> = cases
            .iter()
            .enumerate()
            .map(|(i, case)| (&case.path, i))
            .collect();

        let mut edges: Vec<Option<usize>> = Vec::with_capacity(cases.len());
        for case in &cases {
            match &case.source {
                CaseSource::Copied { reference } => {
                    let target = index.get(reference).copied().ok_or_else(|| {
                        GenerationError::MissingCopySource {
                            path: case.path.to_string(),
                            reference: reference.to_string(),
                        }
                    })?;
                    edges.push(Some(target));
                }
                _ => edges.push(None),
            }
        }

        // Each case has at most one outgoing edge, so following it is the DFS.
        let mut marks: Vec<Option<Mark>> = vec![None; cases.len()];
        let mut depth = vec![0usize; cases.len()];
        for start in 0..cases.len() {
            if marks[start].is_some() {
                continue;
            }
            let mut chain = Vec::new();
            let mut current = Some(start);
            while let Some(node) = current {
                match marks[node] {
                    Some(Mark::Done) => break,
                    Some(Mark::Visiting) => {
                        let from = chain.iter().position(|n| *n == node).unwrap_or(0);
                        let mut cycle: Vec<String> = chain[from..]
                            .iter()
                            .map(|n: &usize| cases[*n].path.to_string())
                            .collect();
                        cycle.push(cases[node].path.to_string());
                        return Err(GenerationError::CopyCycle { cycle });
                    }
                    None => {
                        marks[node] = Some(Mark::Visiting);
                        chain.push(node);
                        current = edges[node];
                    }
                }
            }
            for node in chain.into_iter().rev() {
                depth[node] = edges[node].map(|target| depth[target] + 1).unwrap_or(0);
                marks[node] = Some(Mark::Done);
            }
        }

        let total_levels = depth.iter().max().map(|d| d + 1).unwrap_or(0);
        let mut levels: Vec<Vec<CasePath>> = vec![Vec::new(); total_levels];
        for (case, level) in cases.iter().zip(&depth) {
            levels[*level].push(case.path.clone());
        }

        Ok(Self {
            total_cases: cases.len(),
            total_levels,
            levels,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelSummary {
    pub level_index: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub cancelled_count: usize,
    pub total_count: usize,
}

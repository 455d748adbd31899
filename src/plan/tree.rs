//! Canonical Group/Case tree produced by the loader.

use crate::command::CommandTemplate;
use crate::types::{CasePath, Seed};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a testcase's artifacts come from. Fixed at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseSource {
    Literal {
        input: String,
        answer: Option<String>,
        output: Option<String>,
    },
    Generated {
        command: CommandTemplate,
        salt: String,
        seed: Seed,
    },
    Copied {
        reference: CasePath,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Literal,
    Generated,
    Copied,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Literal => write!(f, "literal"),
            SourceKind::Generated => write!(f, "generated"),
            SourceKind::Copied => write!(f, "copied"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub name: String,
    /// Full path, ending in `name`
    pub path: CasePath,
    /// Path of the enclosing group
    pub group: CasePath,
    pub source: CaseSource,
    /// Effective solution from the case or its nearest group, if any
    pub solution: Option<CommandTemplate>,
    pub visualizer: Option<CommandTemplate>,
    /// 1-based repetition index bound to `{count}`
    pub count_index: u32,
}

impl Case {
    pub fn kind(&self) -> SourceKind {
        match self.source {
            CaseSource::Literal { .. } => SourceKind::Literal,
            CaseSource::Generated { .. } => SourceKind::Generated,
            CaseSource::Copied { .. } => SourceKind::Copied,
        }
    }

    pub fn seed(&self) -> Option<Seed> {
        match &self.source {
            CaseSource::Generated { seed, .. } => Some(*seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Case(Case),
    Group(Group),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Case(case) => &case.name,
            Entry::Group(group) => &group.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub path: CasePath,
    pub entries: Vec<Entry>,
    pub salt: String,
    pub solution: Option<CommandTemplate>,
    pub visualizer: Option<CommandTemplate>,
}

impl Group {
    /// Depth-first walk over all testcases, in declaration order.
    pub fn walk_cases<'a>(&'a self, out: &mut Vec<&'a Case>) {
        for entry in &self.entries {
            match entry {
                Entry::Case(case) => out.push(case),
                Entry::Group(group) => group.walk_cases(out),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseTree {
    pub root: Group,
}

impl CaseTree {
    pub fn cases(&self) -> Vec<&Case> {
        let mut out = Vec::new();
        self.root.walk_cases(&mut out);
        out
    }

    pub fn case_count(&self) -> usize {
        self.cases().len()
    }

    pub fn find_case(&self, path: &CasePath) -> Option<&Case> {
        let mut group = &self.root;
        let segments: Vec<&str> = path.segments().collect();
        let (last, parents) = segments.split_last()?;
        for segment in parents {
            group = group.entries.iter().find_map(|entry| match entry {
                Entry::Group(child) if child.name == *segment => Some(child),
                _ => None,
            })?;
        }
        group.entries.iter().find_map(|entry| match entry {
            Entry::Case(case) if case.name == *last => Some(case),
            _ => None,
        })
    }
}

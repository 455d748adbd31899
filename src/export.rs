//! Export of resolved artifacts into the problem's data directory.
//!
//! Each case becomes `<data>/<group path>/<name>.in` plus `.ans`, `.out` and
//! `.viz` when present. Files whose content is unchanged are left untouched.

use crate::error::EngineError;
use crate::report::{CaseStatus, Report};
use crate::store::{ArtifactStore, CaseRecord};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const ARTIFACT_EXTENSIONS: &[&str] = &["in", "ans", "out", "viz"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub unchanged: usize,
    pub removed: usize,
    /// Cases with a final status but no stored record
    pub missing: Vec<String>,
}

pub struct Exporter<'a> {
    store: &'a dyn ArtifactStore,
    data_dir: PathBuf,
    prune: bool,
}

impl<'a> Exporter<'a> {
    pub fn new(store: &'a dyn ArtifactStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
            prune: false,
        }
    }

    /// Also delete artifact files in the data directory that no case produced.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Write every case that passed or was rejected as expected.
    pub fn export(&self, report: &Report) -> Result<ExportSummary, EngineError> {
        let mut summary = ExportSummary::default();
        let mut produced = BTreeSet::new();

        for case in report.cases() {
            if !matches!(
                case.status,
                CaseStatus::Passed { .. } | CaseStatus::RejectedAsExpected { .. }
            ) {
                continue;
            }
            let Some(record) = self.store.get(&case.path)? else {
                warn!(case = %case.path, "No stored artifacts to export");
                summary.missing.push(case.path.to_string());
                continue;
            };
            let valid = matches!(case.status, CaseStatus::Passed { .. });
            for (path, bytes) in self.files_for(&record, valid) {
                if write_if_changed(&path, bytes)? {
                    summary.written += 1;
                } else {
                    summary.unchanged += 1;
                }
                produced.insert(path);
            }
        }

        if self.prune {
            summary.removed = self.prune_except(&produced)?;
        }

        info!(
            written = summary.written,
            unchanged = summary.unchanged,
            removed = summary.removed,
            "Export completed"
        );
        Ok(summary)
    }

    fn files_for<'r>(&self, record: &'r CaseRecord, valid: bool) -> Vec<(PathBuf, &'r [u8])> {
        let mut dir = self.data_dir.clone();
        if let Some(parent) = record.path.parent() {
            for segment in parent.segments() {
                dir.push(segment);
            }
        }
        let name = record.path.name();
        let artifacts = &record.artifacts;
        let mut files = vec![(dir.join(format!("{}.in", name)), artifacts.input.as_slice())];
        if valid || !artifacts.answer.is_empty() {
            files.push((dir.join(format!("{}.ans", name)), artifacts.answer.as_slice()));
        }
        if let Some(output) = &artifacts.output {
            files.push((dir.join(format!("{}.out", name)), output.as_slice()));
        }
        if let Some(visualization) = &artifacts.visualization {
            files.push((dir.join(format!("{}.viz", name)), visualization.as_slice()));
        }
        files
    }

    fn prune_except(&self, keep: &BTreeSet<PathBuf>) -> Result<usize, EngineError> {
        if !self.data_dir.is_dir() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in WalkDir::new(&self.data_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            let is_artifact = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ARTIFACT_EXTENSIONS.contains(&ext));
            if is_artifact && !keep.contains(path) {
                std::fs::remove_file(path).map_err(|source| EngineError::Export {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!(path = %path.display(), "Removed stale artifact");
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<bool, EngineError> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == bytes {
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| EngineError::Export {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| EngineError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

//! Program lookup under a problem directory.
//!
//! Relative program names resolve inside `generators/`. A leading `/` resolves
//! from the problem root instead (`/submissions/accepted/sol.py`), which is
//! allowed for solutions and visualizers but never for generators.

use crate::error::GenerationError;
use crate::seed::content_fingerprint;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const GENERATORS_DIR: &str = "generators";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramRole {
    Generator,
    Solution,
    Visualizer,
}

pub struct ProgramCatalog {
    root: PathBuf,
    fingerprints: Mutex<HashMap<PathBuf, String>>,
}

impl ProgramCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fingerprints: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, name: &str, role: ProgramRole) -> Result<PathBuf, GenerationError> {
        let path = match name.strip_prefix('/') {
            Some(_) if role == ProgramRole::Generator => {
                return Err(GenerationError::AbsoluteProgram {
                    name: name.to_string(),
                });
            }
            Some(from_root) => self.root.join(from_root),
            None => self.root.join(GENERATORS_DIR).join(name),
        };
        if !path.is_file() {
            return Err(GenerationError::ProgramNotFound {
                name: name.to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// Content hash of a program file, read once per catalog.
    pub fn fingerprint(&self, path: &Path) -> Result<String, GenerationError> {
        if let Some(known) = self.fingerprints.lock().get(path) {
            return Ok(known.clone());
        }
        let bytes = std::fs::read(path).map_err(|_| GenerationError::ProgramNotFound {
            name: path.display().to_string(),
            path: path.to_path_buf(),
        })?;
        let fingerprint = content_fingerprint(&bytes);
        debug!(program = %path.display(), fingerprint = %fingerprint, "Program fingerprinted");
        self.fingerprints
            .lock()
            .insert(path.to_path_buf(), fingerprint.clone());
        Ok(fingerprint)
    }

    /// Files directly inside `<root>/<dir>`, sorted by name. A missing
    /// directory has no programs.
    pub fn programs_in(&self, dir: &str) -> Vec<PathBuf> {
        let dir = self.root.join(dir);
        if !dir.is_dir() {
            return Vec::new();
        }
        let mut programs: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.into_path())
            .collect();
        programs.sort();
        programs
    }
}

//! Artifact Store
//!
//! Holds the resolved artifacts of each testcase, keyed by case path, together
//! with the metadata and cache key they were produced under.

pub mod memory;
pub mod persistence;

pub use memory::MemoryArtifactStore;
pub use persistence::SledArtifactStore;

use crate::error::StorageError;
use crate::plan::SourceKind;
use crate::types::{CasePath, Seed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bytes produced for one testcase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub input: Vec<u8>,
    pub answer: Vec<u8>,
    pub output: Option<Vec<u8>>,
    pub visualization: Option<Vec<u8>>,
}

/// How a record's artifacts came to be
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetadata {
    pub kind: SourceKind,
    pub seed: Option<Seed>,
    pub raw_command: Option<String>,
    pub salt: Option<String>,
    /// Raw command of the solution that produced the answer, if one ran
    pub solution: Option<String>,
    pub copied_from: Option<CasePath>,
}

impl CaseMetadata {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            seed: None,
            raw_command: None,
            salt: None,
            solution: None,
            copied_from: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub path: CasePath,
    pub artifacts: Artifacts,
    pub metadata: CaseMetadata,
    /// Digest of every input that determined the artifacts; `None` is never reused
    pub cache_key: Option<String>,
    pub stored_at: DateTime<Utc>,
}

/// Artifact Store interface
pub trait ArtifactStore: Send + Sync {
    fn get(&self, path: &CasePath) -> Result<Option<CaseRecord>, StorageError>;
    fn put(&self, record: &CaseRecord) -> Result<(), StorageError>;
    fn remove(&self, path: &CasePath) -> Result<(), StorageError>;

    /// All records, ordered by case path
    fn list(&self) -> Result<Vec<CaseRecord>, StorageError>;
}

#[cfg(test)]
pub(crate) fn sample_record(path: &str, input: &str) -> CaseRecord {
    CaseRecord {
        path: CasePath::parse(path),
        artifacts: Artifacts {
            input: input.as_bytes().to_vec(),
            answer: b"ok\n".to_vec(),
            output: None,
            visualization: None,
        },
        metadata: CaseMetadata {
            seed: Some(Seed::new(7)),
            raw_command: Some("gen {seed}".to_string()),
            salt: Some(String::new()),
            ..CaseMetadata::new(SourceKind::Generated)
        },
        cache_key: Some("abc".to_string()),
        stored_at: Utc::now(),
    }
}

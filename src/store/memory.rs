//! In-memory Artifact Store, used for dry runs and tests.

use crate::error::StorageError;
use crate::store::{ArtifactStore, CaseRecord};
use crate::types::CasePath;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    records: RwLock<BTreeMap<CasePath, CaseRecord>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn get(&self, path: &CasePath) -> Result<Option<CaseRecord>, StorageError> {
        Ok(self.records.read().get(path).cloned())
    }

    fn put(&self, record: &CaseRecord) -> Result<(), StorageError> {
        self.records
            .write()
            .insert(record.path.clone(), record.clone());
        Ok(())
    }

    fn remove(&self, path: &CasePath) -> Result<(), StorageError> {
        self.records.write().remove(path);
        Ok(())
    }

    fn list(&self) -> Result<Vec<CaseRecord>, StorageError> {
        Ok(self.records.read().values().cloned().collect())
    }
}

//! Persistence layer for the Artifact Store

use crate::error::StorageError;
use crate::store::{ArtifactStore, CaseRecord};
use crate::types::CasePath;
use std::path::Path;

const CASE_PREFIX: &str = "case:";

/// Sled-based implementation of ArtifactStore
pub struct SledArtifactStore {
    db: sled::Db,
}

impl SledArtifactStore {
    /// Open (or create) the database directory at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)
            .map_err(|e| StorageError::Backend(format!("Failed to open sled database: {}", e)))?;
        Ok(Self { db })
    }

    fn key(path: &CasePath) -> String {
        format!("{}{}", CASE_PREFIX, path.as_str())
    }

    fn decode(path: &str, value: &[u8]) -> Result<CaseRecord, StorageError> {
        bincode::deserialize(value).map_err(|e| StorageError::Corrupt {
            path: path.to_string(),
            message: format!("Failed to deserialize case record: {}", e),
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| StorageError::Backend(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

impl ArtifactStore for SledArtifactStore {
    fn get(&self, path: &CasePath) -> Result<Option<CaseRecord>, StorageError> {
        let key = Self::key(path);
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| StorageError::Backend(format!("Failed to get case record: {}", e)))?
        {
            Some(value) => Ok(Some(Self::decode(path.as_str(), &value)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &CaseRecord) -> Result<(), StorageError> {
        let key = Self::key(&record.path);
        let value = bincode::serialize(record).map_err(|e| StorageError::Corrupt {
            path: record.path.to_string(),
            message: format!("Failed to serialize case record: {}", e),
        })?;
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| StorageError::Backend(format!("Failed to put case record: {}", e)))?;
        Ok(())
    }

    fn remove(&self, path: &CasePath) -> Result<(), StorageError> {
        self.db
            .remove(Self::key(path).as_bytes())
            .map_err(|e| StorageError::Backend(format!("Failed to remove case record: {}", e)))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<CaseRecord>, StorageError> {
        let mut records = Vec::new();
        for item in self.db.scan_prefix(CASE_PREFIX.as_bytes()) {
            let (key, value) = item
                .map_err(|e| StorageError::Backend(format!("Failed to iterate store: {}", e)))?;
            let key = String::from_utf8_lossy(&key);
            records.push(Self::decode(&key[CASE_PREFIX.len()..], &value)?);
        }
        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }
}

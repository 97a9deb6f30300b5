use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use super::{KeyPairRecord, KeyPairStore};
use crate::error::{Error, Result};

/// Type alias for the record storage map
type RecordStorage = Arc<RwLock<HashMap<String, KeyPairRecord>>>;

/// In-memory key pair store for tests and database-free embedders
pub struct MemoryKeyPairStore {
    records: RecordStorage,
}

impl MemoryKeyPairStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryKeyPairStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPairStore for MemoryKeyPairStore {
    fn find(&self, subject_id: &str) -> Result<Option<KeyPairRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| Error::StoreError("Failed to acquire read lock".to_string()))?;
        Ok(records.get(subject_id).cloned())
    }

    fn create(&self, record: KeyPairRecord) -> Result<KeyPairRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::StoreError("Failed to acquire write lock".to_string()))?;

        if records.contains_key(&record.subject_id) {
            return Err(Error::Conflict(record.subject_id));
        }

        records.insert(record.subject_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: KeyPairRecord) -> Result<KeyPairRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::StoreError("Failed to acquire write lock".to_string()))?;

        if !records.contains_key(&record.subject_id) {
            return Err(Error::NotFound(record.subject_id));
        }

        records.insert(record.subject_id.clone(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic_operations() {
        let store = MemoryKeyPairStore::new();
        let record = KeyPairRecord::new("consumer-1", vec![1, 2], vec![3, 4]);

        assert!(store.find("consumer-1").unwrap().is_none());

        store.create(record.clone()).unwrap();
        assert_eq!(store.find("consumer-1").unwrap(), Some(record.clone()));

        let updated = KeyPairRecord::new("consumer-1", vec![5], vec![6]);
        store.update(updated.clone()).unwrap();
        assert_eq!(store.find("consumer-1").unwrap(), Some(updated));
    }

    #[test]
    fn test_memory_store_create_conflict() {
        let store = MemoryKeyPairStore::new();
        let record = KeyPairRecord::new("consumer-1", vec![1], vec![2]);

        store.create(record.clone()).unwrap();
        let err = store.create(record).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_memory_store_update_missing_record() {
        let store = MemoryKeyPairStore::new();
        let err = store
            .update(KeyPairRecord::new("ghost", vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

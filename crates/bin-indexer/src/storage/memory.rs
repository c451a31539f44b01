use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{encode_record, RecordStore};
use crate::error::StoreError;
use crate::models::SemanticRecord;

/// In-process store holding the JSON body of every record
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all stored `(key, json)` pairs in key order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn store(&self, key: &str, record: &SemanticRecord) -> Result<(), StoreError> {
        let body = encode_record(key, record)?;
        self.lock().insert(key.to_string(), body);
        Ok(())
    }
}

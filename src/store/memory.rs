use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::record::{WordRecord, headword_key};
use super::{InsertOutcome, WordStore};

/// Process-local store, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, WordRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    async fn find_by_headword(&self, word: &str) -> Result<Option<WordRecord>> {
        Ok(self.records.lock().await.get(&headword_key(word)).cloned())
    }

    async fn insert(&self, record: WordRecord) -> Result<InsertOutcome> {
        let mut records = self.records.lock().await;
        let key = record.key();
        if records.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.insert(key, record);
        Ok(InsertOutcome::Accepted)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.lock().await.len())
    }

    async fn search(&self, fragment: &str) -> Result<Vec<WordRecord>> {
        let needle = headword_key(fragment);
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .map(|(_, record)| record.clone())
            .collect())
    }
}

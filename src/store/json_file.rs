use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Result, ShabdkoshError};
use crate::record::{WordRecord, headword_key};
use super::{InsertOutcome, WordStore};

/// On-disk layout of the dictionary file
#[derive(Debug, Default, Serialize, Deserialize)]
struct DictionaryFile {
    words: Vec<WordRecord>,
}

/// Dictionary persisted as one JSON document.
///
/// The whole file is rewritten through a temp file and rename on every
/// insert, so a crash never leaves a half-written dictionary behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, WordRecord>>,
}

impl JsonFileStore {
    /// Open the dictionary at `path`, starting empty if the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                ShabdkoshError::StoreUnavailable(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let file: DictionaryFile = serde_json::from_str(&content).map_err(|e| {
                ShabdkoshError::StoreUnavailable(format!("Corrupt dictionary {}: {}", path.display(), e))
            })?;
            file.words.into_iter().map(|r| (r.key(), r)).collect()
        } else {
            BTreeMap::new()
        };

        info!("Opened dictionary {} ({} words)", path.display(), records.len());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Replace the file at `path` with `words`, via a temp file in the same directory
fn write_dictionary(path: &Path, words: Vec<WordRecord>) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir).map_err(unavailable)?;

    let count = words.len();
    let file = DictionaryFile { words };

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(unavailable)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush().map_err(unavailable)?;
    }
    temp_file.persist(path).map_err(|e| {
        ShabdkoshError::StoreUnavailable(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    debug!("Wrote {} words to {}", count, path.display());
    Ok(())
}

fn unavailable(e: std::io::Error) -> ShabdkoshError {
    ShabdkoshError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl WordStore for JsonFileStore {
    async fn find_by_headword(&self, word: &str) -> Result<Option<WordRecord>> {
        Ok(self.records.lock().await.get(&headword_key(word)).cloned())
    }

    async fn insert(&self, record: WordRecord) -> Result<InsertOutcome> {
        let mut records = self.records.lock().await;
        let key = record.key();
        if records.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        records.insert(key.clone(), record);
        let snapshot: Vec<WordRecord> = records.values().cloned().collect();
        let path = self.path.clone();
        // The lock stays held so writes land in insert order
        let written = tokio::task::spawn_blocking(move || write_dictionary(&path, snapshot))
            .await
            .map_err(|e| ShabdkoshError::StoreUnavailable(format!("Dictionary writer failed: {}", e)))
            .and_then(|result| result);

        if let Err(e) = written {
            // Keep memory in step with what is on disk
            records.remove(&key);
            return Err(e);
        }
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

// Word store backends
//
// The store owns record storage. The rest of the crate only proposes records
// through `insert`, which must be insert-if-absent on the case-insensitive
// headword so that concurrent identical searches produce a single record.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::language::Language;
use crate::record::{Translations, WordRecord};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Accepted,
    /// A record with the same headword is already stored; nothing was written
    AlreadyExists,
}

/// Shared dictionary storage.
///
/// Errors from these methods mean the backing store could not be reached
/// (`StoreUnavailable`); a duplicate headword is not an error.
#[async_trait]
pub trait WordStore: Send + Sync {
    async fn find_by_headword(&self, word: &str) -> Result<Option<WordRecord>>;

    async fn insert(&self, record: WordRecord) -> Result<InsertOutcome>;

    async fn count(&self) -> Result<usize>;

    /// Records whose headword contains `fragment`, case-insensitively
    async fn search(&self, fragment: &str) -> Result<Vec<WordRecord>>;
}

/// Factory for creating store instances
pub struct StoreFactory;

impl StoreFactory {
    pub fn create_store(config: &StoreConfig) -> Result<Box<dyn WordStore>> {
        match config.backend {
            StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
            StoreBackend::JsonFile => Ok(Box::new(JsonFileStore::open(&config.path)?)),
        }
    }
}

/// Seed file layout: `{category: {english: {hindi: "...", ...}}}`
type SeedFile = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Load a seed word list into the store, leaving existing headwords untouched
pub async fn import_seed_file(store: &dyn WordStore, path: &Path) -> Result<ImportSummary> {
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_json::from_str(&content)?;

    let mut summary = ImportSummary::default();
    for (category, words) in seed {
        for (english, cells) in words {
            if english.trim().is_empty() {
                continue;
            }

            let mut translations = Translations::empty();
            for (column, text) in cells {
                match column.parse::<Language>() {
                    Ok(language) => translations.set(language, text.trim()),
                    Err(_) => warn!("Ignoring unknown language column '{}' for '{}'", column, english),
                }
            }

            match store.insert(WordRecord::new(&english, &category, translations)).await? {
                InsertOutcome::Accepted => summary.inserted += 1,
                InsertOutcome::AlreadyExists => summary.skipped += 1,
            }
        }
    }

    info!(
        "Imported {} words from {} ({} already present)",
        summary.inserted,
        path.display(),
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn test_import_seed_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let seed = dir.child("common_words.json");
        seed.write_str(
            r#"{
                "fruits": {"mango": {"hindi": "आम"}},
                "vegetables": {
                    "potato": {"hindi": "आलू", "tamil": "உருளைக்கிழங்கு", "elvish": "x"},
                    "Mango": {"hindi": "duplicate"}
                }
            }"#,
        )
        .unwrap();

        let store = MemoryStore::new();
        let summary = import_seed_file(&store, seed.path()).await.unwrap();

        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 1 });
        let mango = store.find_by_headword("MANGO").await.unwrap().unwrap();
        assert_eq!(mango.category, "fruits");
        assert_eq!(mango.translations.get(Language::Hindi), "आम");

        let potato = store.find_by_headword("potato").await.unwrap().unwrap();
        assert_eq!(potato.translations.get(Language::Tamil), "உருளைக்கிழங்கு");
        assert_eq!(potato.translations.len(), Language::COUNT);
    }
}

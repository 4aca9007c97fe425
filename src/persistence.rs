use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

use crate::batch::LanguageOutcome;
use crate::config::PersistenceConfig;
use crate::language::Language;
use crate::record::{Translations, WordRecord};
use crate::store::{InsertOutcome, WordStore};

/// What happened to a batch after translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// Another record with the same headword won; nothing was overwritten
    AlreadyExists,
    BelowThreshold { accepted: usize, total: usize },
    /// Saving was turned off for this search
    Skipped,
    Failed(String),
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saved => write!(f, "saved to dictionary"),
            SaveStatus::AlreadyExists => write!(f, "already exists in dictionary"),
            SaveStatus::BelowThreshold { accepted, total } => {
                write!(f, "not saved: only {}/{} translations accepted", accepted, total)
            }
            SaveStatus::Skipped => write!(f, "not saved"),
            SaveStatus::Failed(reason) => write!(f, "save failed: {}", reason),
        }
    }
}

/// Decides whether a batch is good enough to keep and shapes the record
#[derive(Debug, Clone)]
pub struct PersistencePolicy {
    min_accepted: usize,
    out_of: usize,
}

impl Default for PersistencePolicy {
    fn default() -> Self {
        Self {
            min_accepted: 15,
            out_of: 22,
        }
    }
}

impl PersistencePolicy {
    pub fn new(min_accepted: usize, out_of: usize) -> Self {
        Self { min_accepted, out_of }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.min_accepted, config.out_of)
    }

    /// `accepted / total >= min_accepted / out_of`, compared without rounding
    pub fn should_persist(&self, accepted_count: usize, total: usize) -> bool {
        if total == 0 || self.out_of == 0 {
            return false;
        }
        accepted_count * self.out_of >= self.min_accepted * total
    }

    /// Record holding every accepted text, with "" for the other languages
    pub fn build_record(
        &self,
        headword: &str,
        category: &str,
        outcomes: &BTreeMap<Language, LanguageOutcome>,
    ) -> WordRecord {
        let mut translations = Translations::empty();
        for (language, outcome) in outcomes {
            if outcome.accepted {
                translations.set(*language, outcome.text.trim());
            }
        }
        WordRecord::new(headword, category, translations)
    }

    pub async fn persist(&self, store: &dyn WordStore, record: WordRecord) -> SaveStatus {
        let english = record.english.clone();
        match store.insert(record).await {
            Ok(InsertOutcome::Accepted) => {
                info!("Saved '{}' to dictionary", english);
                SaveStatus::Saved
            }
            Ok(InsertOutcome::AlreadyExists) => {
                info!("'{}' already exists in dictionary", english);
                SaveStatus::AlreadyExists
            }
            Err(e) => {
                warn!("Failed to save '{}': {}", english, e);
                SaveStatus::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ShabdkoshError};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn outcome(language: Language, text: &str, accepted: bool) -> LanguageOutcome {
        LanguageOutcome {
            language,
            text: text.to_string(),
            provider_id: "mock".to_string(),
            accepted,
        }
    }

    #[test]
    fn test_default_threshold_is_15_of_22() {
        let policy = PersistencePolicy::default();
        assert!(policy.should_persist(22, 22));
        assert!(policy.should_persist(15, 22));
        assert!(!policy.should_persist(14, 22));
        assert!(!policy.should_persist(0, 0));
    }

    #[test]
    fn test_threshold_scales_with_total() {
        let policy = PersistencePolicy::default();
        // 15/22 of 11 languages is 7.5
        assert!(policy.should_persist(8, 11));
        assert!(!policy.should_persist(7, 11));

        let strict = PersistencePolicy::new(22, 22);
        assert!(!strict.should_persist(21, 22));
    }

    #[test]
    fn test_build_record_keeps_only_accepted_text() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(Language::Hindi, outcome(Language::Hindi, "आम", true));
        outcomes.insert(Language::Tamil, outcome(Language::Tamil, "மாம்பழம்", true));
        outcomes.insert(Language::Urdu, outcome(Language::Urdu, "mango", false));

        let record = PersistencePolicy::default().build_record(" mango ", "fruits", &outcomes);

        assert_eq!(record.english, "mango");
        assert_eq!(record.category, "fruits");
        assert_eq!(record.translations.len(), Language::COUNT);
        assert_eq!(record.translations.get(Language::Hindi), "आम");
        assert_eq!(record.translations.get(Language::Tamil), "மாம்பழம்");
        assert_eq!(record.translations.get(Language::Urdu), "");
        assert_eq!(record.translations.filled_count(), 2);
    }

    #[tokio::test]
    async fn test_persist_reports_duplicates() {
        let store = MemoryStore::new();
        let policy = PersistencePolicy::default();
        let record = WordRecord::new("mango", "fruits", Translations::empty());

        assert_eq!(policy.persist(&store, record.clone()).await, SaveStatus::Saved);
        assert_eq!(policy.persist(&store, record).await, SaveStatus::AlreadyExists);
    }

    struct OfflineStore;

    #[async_trait]
    impl WordStore for OfflineStore {
        async fn find_by_headword(&self, _word: &str) -> Result<Option<WordRecord>> {
            Err(ShabdkoshError::StoreUnavailable("offline".to_string()))
        }

        async fn insert(&self, _record: WordRecord) -> Result<InsertOutcome> {
            Err(ShabdkoshError::StoreUnavailable("offline".to_string()))
        }

        async fn count(&self) -> Result<usize> {
            Err(ShabdkoshError::StoreUnavailable("offline".to_string()))
        }

        async fn search(&self, _fragment: &str) -> Result<Vec<WordRecord>> {
            Err(ShabdkoshError::StoreUnavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_is_failed() {
        let status = PersistencePolicy::default()
            .persist(&OfflineStore, WordRecord::new("mango", "fruits", Translations::empty()))
            .await;
        assert!(matches!(status, SaveStatus::Failed(reason) if reason.contains("offline")));
    }
}

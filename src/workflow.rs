use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::batch::{BatchResult, BatchTranslator, LanguageOutcome};
use crate::chain::{ChainResult, ProviderChain};
use crate::config::Config;
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;
use crate::persistence::{PersistencePolicy, SaveStatus};
use crate::provider::ProviderFactory;
use crate::quality::QualityClassifier;
use crate::record::{Translations, WordRecord};
use crate::store::{self, ImportSummary, StoreFactory, WordStore};

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Category for a newly saved record; the configured default when unset
    pub category: Option<String>,
    /// Translate even when the word is already in the dictionary
    pub retranslate: bool,
    pub save: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            retranslate: false,
            save: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Served from the dictionary without calling any provider
    Found(WordRecord),
    Translated { batch: BatchResult, save: SaveStatus },
}

/// Health of one provider in the chain
#[derive(Debug)]
pub struct ProviderHealth {
    pub provider_id: &'static str,
    pub status: Result<()>,
}

pub struct Workflow {
    chain: ProviderChain,
    classifier: QualityClassifier,
    policy: PersistencePolicy,
    store: Box<dyn WordStore>,
    request_delay: Duration,
    default_category: String,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let chain = ProviderFactory::create_chain(&config.providers)?;
        let store = StoreFactory::create_store(&config.store)?;
        Ok(Self::with_parts(&config, chain, store))
    }

    /// Assemble a workflow from an already built chain and store
    pub fn with_parts(config: &Config, chain: ProviderChain, store: Box<dyn WordStore>) -> Self {
        Self {
            chain,
            classifier: QualityClassifier::from_config(&config.quality),
            policy: PersistencePolicy::from_config(&config.persistence),
            store,
            request_delay: Duration::from_millis(config.batch.request_delay_ms),
            default_category: config.persistence.default_category.clone(),
        }
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Look a word up, translating and saving it when the dictionary has no entry.
    ///
    /// A store that cannot be read is treated as a miss so the user still gets
    /// translations. Cancellation between languages returns `Cancelled` and
    /// leaves the store untouched.
    pub async fn search<F>(
        &self,
        word: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
        progress: F,
    ) -> Result<SearchOutcome>
    where
        F: FnMut(usize, &LanguageOutcome),
    {
        let word = word.trim();
        if word.is_empty() {
            return Err(ShabdkoshError::InvalidInput("Search word is empty".to_string()));
        }

        if !options.retranslate {
            match self.store.find_by_headword(word).await {
                Ok(Some(record)) => {
                    info!("'{}' found in dictionary", word);
                    return Ok(SearchOutcome::Found(record));
                }
                Ok(None) => info!("'{}' not in dictionary, translating", word),
                Err(e) => warn!("Dictionary lookup for '{}' failed, translating anyway: {}", word, e),
            }
        }

        let batch = BatchTranslator::new(&self.chain, &self.classifier, self.request_delay)
            .translate_all_with_progress(word, &Language::ALL, cancel, progress)
            .await?;

        let save = self.save_batch(&batch, options).await;
        Ok(SearchOutcome::Translated { batch, save })
    }

    async fn save_batch(&self, batch: &BatchResult, options: &SearchOptions) -> SaveStatus {
        if !options.save {
            return SaveStatus::Skipped;
        }
        if !self.policy.should_persist(batch.accepted_count, batch.total_languages) {
            info!(
                "Not saving '{}': {}/{} accepted",
                batch.source_text, batch.accepted_count, batch.total_languages
            );
            return SaveStatus::BelowThreshold {
                accepted: batch.accepted_count,
                total: batch.total_languages,
            };
        }

        let category = options
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.default_category);
        let record = self.policy.build_record(&batch.source_text, category, &batch.outcomes);
        self.policy.persist(self.store.as_ref(), record).await
    }

    /// Translate a single text into one language without touching the dictionary
    pub async fn translate_text(&self, text: &str, language: Language) -> ChainResult {
        self.chain.run(text, language).await
    }

    /// Add a hand-entered record
    pub async fn add_word(
        &self,
        english: &str,
        category: Option<&str>,
        translations: Translations,
    ) -> Result<SaveStatus> {
        if english.trim().is_empty() {
            return Err(ShabdkoshError::InvalidInput("English word is empty".to_string()));
        }
        if translations.filled_count() == 0 {
            return Err(ShabdkoshError::InvalidInput(
                "At least one translation is required".to_string(),
            ));
        }

        let category = category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.default_category);
        let record = WordRecord::new(english, category, translations);
        Ok(self.policy.persist(self.store.as_ref(), record).await)
    }

    pub async fn import_seed<P: AsRef<Path>>(&self, path: P) -> Result<ImportSummary> {
        store::import_seed_file(self.store.as_ref(), path.as_ref()).await
    }

    pub async fn word_count(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Dictionary entries whose headword contains `fragment`
    pub async fn search_store(&self, fragment: &str) -> Result<Vec<WordRecord>> {
        self.store.search(fragment.trim()).await
    }

    pub fn usage_report(&self) -> String {
        self.chain.usage_report()
    }

    pub async fn check_providers(&self) -> Vec<ProviderHealth> {
        let mut report = Vec::new();
        for provider in self.chain.providers() {
            let status = provider.health_check().await;
            match &status {
                Ok(()) => info!("Provider '{}' is healthy", provider.id()),
                Err(e) => warn!("Provider '{}' failed health check: {}", provider.id(), e),
            }
            report.push(ProviderHealth {
                provider_id: provider.id(),
                status,
            });
        }
        report
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chain::ProviderChain;
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;
use crate::quality::QualityClassifier;

/// Result of translating one word into one language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageOutcome {
    pub language: Language,
    /// Text shown to the user; only stored when `accepted`
    pub text: String,
    pub provider_id: String,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub source_text: String,
    pub outcomes: BTreeMap<Language, LanguageOutcome>,
    pub accepted_count: usize,
    pub total_languages: usize,
}

impl BatchResult {
    pub fn quality_percentage(&self) -> f64 {
        if self.total_languages == 0 {
            return 0.0;
        }
        self.accepted_count as f64 / self.total_languages as f64 * 100.0
    }
}

/// Drives the provider chain across a set of target languages
pub struct BatchTranslator<'a> {
    chain: &'a ProviderChain,
    classifier: &'a QualityClassifier,
    request_delay: Duration,
}

impl<'a> BatchTranslator<'a> {
    pub fn new(chain: &'a ProviderChain, classifier: &'a QualityClassifier, request_delay: Duration) -> Self {
        Self {
            chain,
            classifier,
            request_delay,
        }
    }

    pub async fn translate_all(
        &self,
        source_text: &str,
        languages: &[Language],
        cancel: &CancellationToken,
    ) -> Result<BatchResult> {
        self.translate_all_with_progress(source_text, languages, cancel, |_, _| {}).await
    }

    /// Translate into each language in order, pausing between requests.
    ///
    /// Repeated languages are translated once, at their first position.
    /// `progress` is called after every language with the number completed so
    /// far. Returns `Cancelled` if `cancel` fires between languages; partial
    /// results are dropped.
    pub async fn translate_all_with_progress<F>(
        &self,
        source_text: &str,
        languages: &[Language],
        cancel: &CancellationToken,
        mut progress: F,
    ) -> Result<BatchResult>
    where
        F: FnMut(usize, &LanguageOutcome),
    {
        let source_text = source_text.trim();
        if source_text.is_empty() {
            return Err(ShabdkoshError::InvalidInput("Cannot translate an empty word".to_string()));
        }

        let mut seen = BTreeSet::new();
        let languages: Vec<Language> = languages.iter().copied().filter(|l| seen.insert(*l)).collect();

        info!("Translating '{}' into {} languages", source_text, languages.len());

        let mut outcomes = BTreeMap::new();
        for (idx, &language) in languages.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Batch for '{}' cancelled after {} languages", source_text, idx);
                return Err(ShabdkoshError::Cancelled);
            }

            let outcome = self.translate_one(source_text, language).await;
            info!(
                "[{}/{}] {}: {} ({}{})",
                idx + 1,
                languages.len(),
                language,
                outcome.text,
                outcome.provider_id,
                if outcome.accepted { "" } else { ", rejected" }
            );
            progress(idx + 1, &outcome);
            outcomes.insert(language, outcome);

            if idx + 1 < languages.len() && !self.request_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        warn!("Batch for '{}' cancelled after {} languages", source_text, idx + 1);
                        return Err(ShabdkoshError::Cancelled);
                    }
                    _ = tokio::time::sleep(self.request_delay) => {}
                }
            }
        }

        let accepted_count = outcomes.values().filter(|o| o.accepted).count();
        let result = BatchResult {
            source_text: source_text.to_string(),
            total_languages: languages.len(),
            outcomes,
            accepted_count,
        };

        info!(
            "'{}': {}/{} accepted ({:.1}%)",
            source_text,
            result.accepted_count,
            result.total_languages,
            result.quality_percentage()
        );

        Ok(result)
    }

    async fn translate_one(&self, source_text: &str, language: Language) -> LanguageOutcome {
        let chained = self.chain.run(source_text, language).await;

        if chained.accepted {
            let accepted = self.classifier.is_accepted(source_text, &chained.text);
            return LanguageOutcome {
                language,
                text: chained.text,
                provider_id: chained.provider_id,
                accepted,
            };
        }

        // Show what a provider actually said rather than the bare sentinel
        match chained.rejected {
            Some(rejected) if !rejected.translated_text.trim().is_empty() => LanguageOutcome {
                language,
                text: rejected.translated_text,
                provider_id: rejected.provider_id,
                accepted: false,
            },
            _ => LanguageOutcome {
                language,
                text: chained.text,
                provider_id: chained.provider_id,
                accepted: false,
            },
        }
    }
}

// Pluggable translation providers
//
// Each provider wraps one translation source behind the same trait:
// - Sarvam: commercial Indic translation API
// - Gemini: general-purpose LLM API
// - MyMemory: free community translation API
// - Local: self-hosted translation microservice
// - Dictionary: in-process table of common words, the terminal fallback
//
// Wire formats and response cleanup stay private to each provider. Callers
// only ever see a `ProviderResult`.

pub mod common;
pub mod dictionary;
pub mod gemini;
pub mod local;
pub mod mymemory;
pub mod sarvam;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::chain::ProviderChain;
use crate::config::ProvidersConfig;
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Usable translation
    Accepted,
    /// The provider answered, but with something that is not a translation
    Rejected,
    /// Unsupported language, network failure, timeout or rate limit
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub provider_id: String,
    pub translated_text: String,
    pub outcome: Outcome,
}

impl ProviderResult {
    pub fn accepted(provider_id: &str, text: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            translated_text: text.into(),
            outcome: Outcome::Accepted,
        }
    }

    pub fn rejected(provider_id: &str, text: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            translated_text: text.into(),
            outcome: Outcome::Rejected,
        }
    }

    pub fn unavailable(provider_id: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            translated_text: String::new(),
            outcome: Outcome::Unavailable,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

/// Count of accepted translations served by one provider
#[derive(Debug, Default)]
pub struct UsageCounter(AtomicU64);

impl UsageCounter {
    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Main trait for translation sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Stable identifier used in logs, statistics and config
    fn id(&self) -> &'static str;

    /// Whether this provider can translate into `language` at all
    fn supports(&self, language: Language) -> bool;

    /// Translate `text` into `language`.
    ///
    /// Never fails: every failure mode is folded into the returned outcome.
    /// Unsupported languages return `Unavailable` without any I/O.
    async fn attempt(&self, text: &str, language: Language) -> ProviderResult;

    /// Number of `Accepted` results produced so far
    fn usage_count(&self) -> u64;

    /// Check that the provider is reachable and configured
    async fn health_check(&self) -> Result<()>;
}

/// Factory for creating provider instances from configuration
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider named `id`.
    ///
    /// Returns `Ok(None)` when the provider needs a credential that is not
    /// configured, so the chain can be assembled without it.
    pub fn create_provider(
        id: &str,
        config: &ProvidersConfig,
    ) -> Result<Option<Box<dyn TranslationProvider>>> {
        let provider: Box<dyn TranslationProvider> = match id.to_lowercase().as_str() {
            sarvam::PROVIDER_ID => match sarvam::SarvamProvider::new(&config.sarvam, config)? {
                Some(provider) => Box::new(provider),
                None => return Ok(None),
            },
            gemini::PROVIDER_ID => match gemini::GeminiProvider::new(&config.gemini, config)? {
                Some(provider) => Box::new(provider),
                None => return Ok(None),
            },
            mymemory::PROVIDER_ID => Box::new(mymemory::MyMemoryProvider::new(&config.mymemory, config)?),
            local::PROVIDER_ID => Box::new(local::LocalServiceProvider::new(&config.local, config)?),
            dictionary::PROVIDER_ID => Box::new(dictionary::StaticDictionaryProvider::new()),
            other => {
                return Err(ShabdkoshError::Config(format!(
                    "Unknown translation provider: {}",
                    other
                )));
            }
        };
        Ok(Some(provider))
    }

    /// Build the fallback chain in the configured order
    pub fn create_chain(config: &ProvidersConfig) -> Result<ProviderChain> {
        let mut providers = Vec::new();
        for id in &config.order {
            match Self::create_provider(id, config)? {
                Some(provider) => {
                    info!("Provider '{}' enabled at position {}", provider.id(), providers.len() + 1);
                    providers.push(provider);
                }
                None => warn!("Provider '{}' skipped: no credentials configured", id),
            }
        }

        if providers.is_empty() {
            return Err(ShabdkoshError::Config(
                "No translation providers could be enabled".to_string(),
            ));
        }

        Ok(ProviderChain::new(providers))
    }
}

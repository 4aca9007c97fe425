use tracing::debug;

use crate::language::Language;
use crate::provider::{Outcome, ProviderResult, TranslationProvider};

/// Text reported when every provider failed for a language
pub const UNAVAILABLE_TEXT: &str = "Translation unavailable";

/// Provider id reported when no provider produced the text
pub const NO_PROVIDER: &str = "none";

/// What the chain settled on for one (text, language) request
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResult {
    pub text: String,
    pub provider_id: String,
    /// True when some provider returned `Accepted`
    pub accepted: bool,
    /// First rejected output seen, kept so it can be shown to the user
    pub rejected: Option<ProviderResult>,
}

impl ChainResult {
    fn exhausted(rejected: Option<ProviderResult>) -> Self {
        Self {
            text: UNAVAILABLE_TEXT.to_string(),
            provider_id: NO_PROVIDER.to_string(),
            accepted: false,
            rejected,
        }
    }
}

/// Ordered fallback over translation providers.
///
/// Providers are tried most-preferred first and the first accepted result
/// wins; nothing is cached between calls.
pub struct ProviderChain {
    providers: Vec<Box<dyn TranslationProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn TranslationProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn providers(&self) -> &[Box<dyn TranslationProvider>] {
        &self.providers
    }

    /// Translate and return `(text, provider_id)`.
    ///
    /// Empty input gives `("", "none")`; exhaustion gives
    /// `("Translation unavailable", "none")`.
    pub async fn translate(&self, text: &str, language: Language) -> (String, String) {
        let result = self.run(text, language).await;
        (result.text, result.provider_id)
    }

    pub async fn run(&self, text: &str, language: Language) -> ChainResult {
        let text = text.trim();
        if text.is_empty() {
            return ChainResult {
                text: String::new(),
                provider_id: NO_PROVIDER.to_string(),
                accepted: false,
                rejected: None,
            };
        }

        let mut first_rejected = None;
        for provider in &self.providers {
            let result = provider.attempt(text, language).await;
            match result.outcome {
                Outcome::Accepted => {
                    debug!("{} -> {} via {}", text, language, result.provider_id);
                    return ChainResult {
                        text: result.translated_text,
                        provider_id: result.provider_id,
                        accepted: true,
                        rejected: first_rejected,
                    };
                }
                Outcome::Rejected => {
                    debug!("{} rejected {} for {}", result.provider_id, text, language);
                    if first_rejected.is_none() {
                        first_rejected = Some(result);
                    }
                }
                Outcome::Unavailable => {
                    debug!("{} unavailable for {}", result.provider_id, language);
                }
            }
        }

        ChainResult::exhausted(first_rejected)
    }

    /// Accepted-translation counts per provider, e.g. `sarvam: 3 | dictionary: 1 | Total: 4`
    pub fn usage_report(&self) -> String {
        let counts: Vec<(&'static str, u64)> = self
            .providers
            .iter()
            .map(|p| (p.id(), p.usage_count()))
            .collect();
        let total: u64 = counts.iter().map(|(_, count)| count).sum();
        if total == 0 {
            return "No translations yet".to_string();
        }

        let mut parts: Vec<String> = counts
            .iter()
            .map(|(id, count)| format!("{}: {}", id, count))
            .collect();
        parts.push(format!("Total: {}", total));
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTranslationProvider;

    fn mock(id: &'static str, outcome: Outcome, text: &'static str) -> MockTranslationProvider {
        let mut provider = MockTranslationProvider::new();
        provider.expect_id().return_const(id);
        provider.expect_attempt().returning(move |_, _| ProviderResult {
            provider_id: id.to_string(),
            translated_text: text.to_string(),
            outcome,
        });
        provider
    }

    #[tokio::test]
    async fn test_first_accepted_wins_and_stops() {
        let first = mock("first", Outcome::Unavailable, "");
        let second = mock("second", Outcome::Accepted, "आम");
        let mut third = MockTranslationProvider::new();
        third.expect_id().return_const("third");
        third.expect_attempt().never();

        let chain = ProviderChain::new(vec![Box::new(first), Box::new(second), Box::new(third)]);
        let (text, provider_id) = chain.translate("mango", Language::Hindi).await;

        assert_eq!(text, "आम");
        assert_eq!(provider_id, "second");
    }

    #[tokio::test]
    async fn test_exhaustion_returns_sentinel() {
        let chain = ProviderChain::new(vec![
            Box::new(mock("first", Outcome::Unavailable, "")),
            Box::new(mock("second", Outcome::Rejected, "xyzzy123")),
            Box::new(mock("third", Outcome::Rejected, "other")),
        ]);

        let result = chain.run("xyzzy123", Language::Tamil).await;

        assert_eq!(result.text, UNAVAILABLE_TEXT);
        assert_eq!(result.provider_id, NO_PROVIDER);
        assert!(!result.accepted);
        let rejected = result.rejected.unwrap();
        assert_eq!(rejected.provider_id, "second");
        assert_eq!(rejected.translated_text, "xyzzy123");
    }

    #[tokio::test]
    async fn test_empty_text_invokes_no_provider() {
        let mut provider = MockTranslationProvider::new();
        provider.expect_attempt().never();

        let chain = ProviderChain::new(vec![Box::new(provider)]);
        let result = chain.translate("   ", Language::Hindi).await;

        assert_eq!(result, (String::new(), NO_PROVIDER.to_string()));
    }

    #[tokio::test]
    async fn test_input_is_trimmed_before_dispatch() {
        let mut provider = MockTranslationProvider::new();
        provider
            .expect_attempt()
            .withf(|text, language| text.to_string() == "mango" && *language == Language::Bengali)
            .times(1)
            .returning(|_, _| ProviderResult::accepted("only", "আম"));

        let chain = ProviderChain::new(vec![Box::new(provider)]);
        assert_eq!(chain.translate("  mango\n", Language::Bengali).await.0, "আম");
    }

    #[test]
    fn test_usage_report() {
        let mut sarvam = MockTranslationProvider::new();
        sarvam.expect_id().return_const("sarvam");
        sarvam.expect_usage_count().return_const(3u64);
        let mut dictionary = MockTranslationProvider::new();
        dictionary.expect_id().return_const("dictionary");
        dictionary.expect_usage_count().return_const(1u64);

        let chain = ProviderChain::new(vec![Box::new(sarvam), Box::new(dictionary)]);
        assert_eq!(chain.usage_report(), "sarvam: 3 | dictionary: 1 | Total: 4");

        let mut idle = MockTranslationProvider::new();
        idle.expect_id().return_const("idle");
        idle.expect_usage_count().return_const(0u64);
        assert_eq!(ProviderChain::new(vec![Box::new(idle)]).usage_report(), "No translations yet");
    }
}

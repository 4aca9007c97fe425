use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ProvidersConfig, SarvamConfig};
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;
use super::common::{self, RetryPolicy};
use super::{ProviderResult, TranslationProvider, UsageCounter};

pub const PROVIDER_ID: &str = "sarvam";

/// Languages covered by the `mayura` model family
const MAYURA_LANGUAGES: [Language; 10] = [
    Language::Hindi,
    Language::Bengali,
    Language::Tamil,
    Language::Telugu,
    Language::Malayalam,
    Language::Kannada,
    Language::Marathi,
    Language::Gujarati,
    Language::Odia,
    Language::Punjabi,
];

#[derive(Debug, Serialize)]
struct SarvamRequest<'a> {
    input: &'a str,
    source_language_code: &'static str,
    target_language_code: String,
    speaker_gender: &'static str,
    mode: &'static str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct SarvamResponse {
    translated_text: Option<String>,
}

/// Commercial Indic translation API
pub struct SarvamProvider {
    client: Client,
    config: SarvamConfig,
    api_key: String,
    retry: RetryPolicy,
    usage: UsageCounter,
}

impl SarvamProvider {
    /// Returns `Ok(None)` when no subscription key is configured
    pub fn new(config: &SarvamConfig, providers: &ProvidersConfig) -> Result<Option<Self>> {
        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Ok(None),
        };

        Ok(Some(Self {
            client: common::build_client(config.timeout_secs)?,
            config: config.clone(),
            api_key,
            retry: RetryPolicy::from_config(providers),
            usage: UsageCounter::default(),
        }))
    }

    fn clean(raw: &str) -> String {
        common::strip_wrapping_quotes(raw).to_string()
    }
}

#[async_trait]
impl TranslationProvider for SarvamProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, language: Language) -> bool {
        if self.config.model.starts_with("mayura") {
            MAYURA_LANGUAGES.contains(&language)
        } else {
            true
        }
    }

    async fn attempt(&self, text: &str, language: Language) -> ProviderResult {
        if !self.supports(language) {
            debug!("{} does not support {} with model {}", PROVIDER_ID, language, self.config.model);
            return ProviderResult::unavailable(PROVIDER_ID);
        }

        let url = format!("{}/translate", self.config.endpoint.trim_end_matches('/'));
        let request = SarvamRequest {
            input: text,
            source_language_code: "en-IN",
            target_language_code: language.indic_code(),
            speaker_gender: "Male",
            mode: "formal",
            model: &self.config.model,
        };

        let Some(response) = common::send_with_retry(PROVIDER_ID, &self.retry, || {
            self.client
                .post(&url)
                .header("api-subscription-key", &self.api_key)
                .json(&request)
        })
        .await
        else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let Some(parsed) = common::read_json::<SarvamResponse>(PROVIDER_ID, response).await else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        match parsed.translated_text.map(|raw| Self::clean(&raw)) {
            Some(cleaned) if !cleaned.is_empty() => {
                self.usage.record();
                ProviderResult::accepted(PROVIDER_ID, cleaned)
            }
            Some(_) => ProviderResult::rejected(PROVIDER_ID, ""),
            None => ProviderResult::unavailable(PROVIDER_ID),
        }
    }

    fn usage_count(&self) -> u64 {
        self.usage.get()
    }

    async fn health_check(&self) -> Result<()> {
        match self.attempt("hello", Language::Hindi).await.outcome {
            super::Outcome::Accepted => Ok(()),
            _ => Err(ShabdkoshError::Provider(format!(
                "{} did not return a translation from {}",
                PROVIDER_ID, self.config.endpoint
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provider::Outcome;
    use crate::provider::common::test_support::{serve_once, watch_for_connection};
    use std::time::Duration;

    fn provider(endpoint: &str, model: &str) -> SarvamProvider {
        let mut providers = Config::default().providers;
        providers.sarvam.endpoint = endpoint.to_string();
        providers.sarvam.model = model.to_string();
        providers.sarvam.api_key = Some("test-key".to_string());
        SarvamProvider::new(&providers.sarvam, &providers).unwrap().unwrap()
    }

    #[test]
    fn test_disabled_without_key() {
        let providers = Config::default().providers;
        assert!(SarvamProvider::new(&providers.sarvam, &providers).unwrap().is_none());
    }

    #[test]
    fn test_mayura_supports_ten_languages() {
        let sarvam = provider("http://127.0.0.1:9", "mayura:v1");
        let supported = Language::ALL.iter().filter(|l| sarvam.supports(**l)).count();
        assert_eq!(supported, 10);
        assert!(!sarvam.supports(Language::Santali));

        let wide = provider("http://127.0.0.1:9", "sarvam-translate:v1");
        assert!(Language::ALL.iter().all(|l| wide.supports(*l)));
    }

    #[tokio::test]
    async fn test_unsupported_language_makes_no_request() {
        let (endpoint, connected) = watch_for_connection(Duration::from_millis(200)).await;
        let sarvam = provider(&endpoint, "mayura:v1");

        let result = sarvam.attempt("mango", Language::Bodo).await;

        assert_eq!(result.outcome, Outcome::Unavailable);
        assert!(!connected.await.unwrap());
        assert_eq!(sarvam.usage_count(), 0);
    }

    #[tokio::test]
    async fn test_accepted_translation_and_wire_format() {
        let (endpoint, request) = serve_once(200, r#"{"translated_text":" \"आम\" "}"#).await;
        let sarvam = provider(&endpoint, "mayura:v1");

        let result = sarvam.attempt("mango", Language::Hindi).await;

        assert_eq!(result, ProviderResult::accepted(PROVIDER_ID, "आम"));
        assert_eq!(sarvam.usage_count(), 1);

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /translate"));
        assert!(request.to_lowercase().contains("api-subscription-key: test-key"));
        assert!(request.contains("\"target_language_code\":\"hi-IN\""));
        assert!(request.contains("\"source_language_code\":\"en-IN\""));
    }

    #[tokio::test]
    async fn test_client_error_is_unavailable() {
        let (endpoint, _request) = serve_once(403, r#"{"error":"invalid key"}"#).await;
        let sarvam = provider(&endpoint, "mayura:v1");

        let result = sarvam.attempt("mango", Language::Tamil).await;

        assert_eq!(result.outcome, Outcome::Unavailable);
        assert_eq!(sarvam.usage_count(), 0);
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::{GeminiConfig, ProvidersConfig};
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;
use super::common::{self, RetryPolicy};
use super::{ProviderResult, TranslationProvider, UsageCounter};

pub const PROVIDER_ID: &str = "gemini";

/// Labels the model sometimes puts in front of its answer
const ANSWER_LABELS: [&str; 3] = ["Translation:", "Translated text:", "Answer:"];

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// General-purpose LLM prompted to act as a translator
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
    retry: RetryPolicy,
    usage: UsageCounter,
}

impl GeminiProvider {
    /// Returns `Ok(None)` when no API key is configured
    pub fn new(config: &GeminiConfig, providers: &ProvidersConfig) -> Result<Option<Self>> {
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

    fn build_prompt(text: &str, language: Language) -> String {
        format!(
            "Translate the following English text to {} ({}).\n\
             Reply with ONLY the {} translation written in its native script. \
             Do not add explanations, transliterations or alternatives.\n\
             \n\
             Text: {}",
            language.name(),
            language.native_name(),
            language.name(),
            text
        )
    }

    /// Pull the generated text out of the response envelope
    fn extract_text(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }

    fn clean(raw: &str) -> String {
        let text = common::remove_markdown_code_blocks(raw);
        let text = common::first_line(text);
        let text = common::strip_label(text, &ANSWER_LABELS);
        common::strip_wrapping_quotes(text).to_string()
    }
}

#[async_trait]
impl TranslationProvider for GeminiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, _language: Language) -> bool {
        true
    }

    async fn attempt(&self, text: &str, language: Language) -> ProviderResult {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": Self::build_prompt(text, language) }] }],
            "generationConfig": { "temperature": 0.1 }
        });

        debug!("Sending {} request for {}", PROVIDER_ID, language);

        let Some(response) = common::send_with_retry(PROVIDER_ID, &self.retry, || {
            self.client
                .post(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(&body)
        })
        .await
        else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let Some(raw) = common::read_json::<GenerateContentResponse>(PROVIDER_ID, response)
            .await
            .and_then(Self::extract_text)
        else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let cleaned = Self::clean(&raw);
        if cleaned.is_empty() {
            return ProviderResult::rejected(PROVIDER_ID, cleaned);
        }

        self.usage.record();
        ProviderResult::accepted(PROVIDER_ID, cleaned)
    }

    fn usage_count(&self) -> u64 {
        self.usage.get()
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!(
            "{}/v1beta/models/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(common::redact)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ShabdkoshError::Provider(format!(
                "{} model '{}' not reachable: {}",
                PROVIDER_ID,
                self.config.model,
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provider::Outcome;
    use crate::provider::common::test_support::{capture_logs, captured_text, closed_port, serve_once};

    fn provider(endpoint: &str) -> GeminiProvider {
        let mut providers = Config::default().providers;
        providers.gemini.endpoint = endpoint.to_string();
        providers.gemini.api_key = Some("secret".to_string());
        GeminiProvider::new(&providers.gemini, &providers).unwrap().unwrap()
    }

    #[test]
    fn test_clean_strips_llm_artifacts() {
        assert_eq!(GeminiProvider::clean("Translation: \"आम\"\n"), "आम");
        assert_eq!(GeminiProvider::clean("```\nમાંગો\n```"), "માંગો");
        assert_eq!(GeminiProvider::clean("\n\nಮಾವು\n(mango)"), "ಮಾವು");
    }

    #[test]
    fn test_prompt_embeds_language_and_text() {
        let prompt = GeminiProvider::build_prompt("mango", Language::Kannada);
        assert!(prompt.contains("Kannada"));
        assert!(prompt.contains("ಕನ್ನಡ"));
        assert!(prompt.ends_with("Text: mango"));
    }

    #[tokio::test]
    async fn test_unwraps_generation_envelope() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Translation: മാമ്പഴം"}],"role":"model"}}]}"#;
        let (endpoint, request) = serve_once(200, body).await;
        let gemini = provider(&endpoint);

        let result = gemini.attempt("mango", Language::Malayalam).await;

        assert_eq!(result, ProviderResult::accepted(PROVIDER_ID, "മാമ്പഴം"));
        assert_eq!(gemini.usage_count(), 1);
        let request = request.await.unwrap();
        assert!(request.contains("POST /v1beta/models/gemini-1.5-flash:generateContent HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-goog-api-key: secret"));
        assert!(!request.contains("key=secret"));
        assert!(request.contains("Malayalam"));
    }

    #[tokio::test]
    async fn test_structural_mismatch_is_unavailable() {
        let (endpoint, _request) = serve_once(200, r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).await;
        let gemini = provider(&endpoint);

        let result = gemini.attempt("mango", Language::Hindi).await;

        assert_eq!(result.outcome, Outcome::Unavailable);
        assert_eq!(gemini.usage_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_keeps_key_out_of_logs() {
        let endpoint = closed_port().await;
        let mut providers = Config::default().providers;
        providers.gemini.endpoint = endpoint;
        providers.gemini.api_key = Some("SUPERSECRETKEY".to_string());
        let gemini = GeminiProvider::new(&providers.gemini, &providers).unwrap().unwrap();
        let (logs, _guard) = capture_logs();

        let result = gemini.attempt("mango", Language::Hindi).await;
        let health = gemini.health_check().await;

        assert_eq!(result.outcome, Outcome::Unavailable);
        let logged = captured_text(&logs);
        assert!(logged.contains("gemini request failed"));
        assert!(!logged.contains("SUPERSECRETKEY"));
        let error = health.unwrap_err().to_string();
        assert!(!error.contains("SUPERSECRETKEY"));
    }
}

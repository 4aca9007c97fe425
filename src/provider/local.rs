use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{LocalServiceConfig, ProvidersConfig};
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;
use super::common::{self, RetryPolicy};
use super::{ProviderResult, TranslationProvider, UsageCounter};

pub const PROVIDER_ID: &str = "local";

#[derive(Debug, Serialize)]
struct LocalRequest<'a> {
    text: &'a str,
    target_language: &'static str,
}

#[derive(Debug, Deserialize)]
struct LocalResponse {
    success: bool,
    translation: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Self-hosted translation model behind a small HTTP service
pub struct LocalServiceProvider {
    client: Client,
    config: LocalServiceConfig,
    retry: RetryPolicy,
    usage: UsageCounter,
}

impl LocalServiceProvider {
    pub fn new(config: &LocalServiceConfig, providers: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: common::build_client(config.timeout_secs)?,
            config: config.clone(),
            retry: RetryPolicy::from_config(providers),
            usage: UsageCounter::default(),
        })
    }

    fn base_url(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    fn clean(raw: &str) -> String {
        let text = common::first_line(raw);
        common::strip_wrapping_quotes(text).to_string()
    }
}

#[async_trait]
impl TranslationProvider for LocalServiceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, _language: Language) -> bool {
        true
    }

    async fn attempt(&self, text: &str, language: Language) -> ProviderResult {
        let url = format!("{}/translate", self.base_url());
        let request = LocalRequest {
            text,
            target_language: language.name(),
        };

        let Some(response) = common::send_with_retry(PROVIDER_ID, &self.retry, || {
            self.client.post(&url).json(&request)
        })
        .await
        else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let Some(parsed) = common::read_json::<LocalResponse>(PROVIDER_ID, response).await else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        if !parsed.success {
            warn!(
                "{} failed: {}",
                PROVIDER_ID,
                parsed.error.as_deref().unwrap_or("no error message")
            );
            return ProviderResult::unavailable(PROVIDER_ID);
        }

        let cleaned = parsed.translation.as_deref().map(Self::clean).unwrap_or_default();
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
        let url = format!("{}/health", self.base_url());
        let response = self.client.get(&url).send().await.map_err(common::redact)?;
        if !response.status().is_success() {
            return Err(ShabdkoshError::Provider(format!(
                "{} health check returned {}",
                PROVIDER_ID,
                response.status()
            )));
        }

        let health: HealthResponse = response.json().await.map_err(common::redact)?;
        if health.status == "healthy" {
            Ok(())
        } else {
            Err(ShabdkoshError::Provider(format!(
                "{} reports status '{}'",
                PROVIDER_ID, health.status
            )))
        }
    }
}

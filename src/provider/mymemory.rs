use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{MyMemoryConfig, ProvidersConfig};
use crate::error::{Result, ShabdkoshError};
use crate::language::Language;
use super::common::{self, RetryPolicy};
use super::{ProviderResult, TranslationProvider, UsageCounter};

pub const PROVIDER_ID: &str = "mymemory";

/// Quota and error notices arrive as translations with a 200 status
const SERVICE_NOTICES: [&str; 3] = ["MYMEMORY WARNING", "QUERY LENGTH LIMIT", "INVALID LANGUAGE PAIR"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: ResponseData,
    /// Sent as a number or a string depending on the error path
    response_status: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

/// Free community translation memory
pub struct MyMemoryProvider {
    client: Client,
    config: MyMemoryConfig,
    retry: RetryPolicy,
    usage: UsageCounter,
}

impl MyMemoryProvider {
    pub fn new(config: &MyMemoryConfig, providers: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: common::build_client(config.timeout_secs)?,
            config: config.clone(),
            retry: RetryPolicy::from_config(providers),
            usage: UsageCounter::default(),
        })
    }

    fn language_pair(language: Language) -> String {
        format!("en|{}", language.iso_code())
    }

    fn status_code(status: &Option<Value>) -> Option<u64> {
        match status {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn clean(raw: &str) -> String {
        common::strip_wrapping_quotes(raw).to_string()
    }

    fn classify(source: &str, response: MyMemoryResponse) -> ProviderResult {
        if let Some(status) = Self::status_code(&response.response_status) {
            if status != 200 {
                warn!("{} reported status {}", PROVIDER_ID, status);
                return ProviderResult::unavailable(PROVIDER_ID);
            }
        }

        let Some(raw) = response.response_data.translated_text else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let upper = raw.trim().to_uppercase();
        if SERVICE_NOTICES.iter().any(|notice| upper.starts_with(notice)) {
            warn!("{} notice: {}", PROVIDER_ID, common::truncate(&raw, 120));
            return ProviderResult::unavailable(PROVIDER_ID);
        }

        let cleaned = Self::clean(&raw);
        if cleaned.is_empty() {
            return ProviderResult::rejected(PROVIDER_ID, cleaned);
        }

        // This service echoes the query back when it has no translation
        if cleaned.to_lowercase() == source.trim().to_lowercase() {
            debug!("{} echoed the source text", PROVIDER_ID);
            return ProviderResult::rejected(PROVIDER_ID, cleaned);
        }

        ProviderResult::accepted(PROVIDER_ID, cleaned)
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, _language: Language) -> bool {
        true
    }

    async fn attempt(&self, text: &str, language: Language) -> ProviderResult {
        let url = format!("{}/get", self.config.endpoint.trim_end_matches('/'));
        let pair = Self::language_pair(language);
        let mut query = vec![("q", text), ("langpair", pair.as_str())];
        if let Some(email) = self.config.email.as_deref() {
            query.push(("de", email));
        }

        let Some(response) = common::send_with_retry(PROVIDER_ID, &self.retry, || {
            self.client.get(&url).query(&query)
        })
        .await
        else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let Some(parsed) = common::read_json::<MyMemoryResponse>(PROVIDER_ID, response).await else {
            return ProviderResult::unavailable(PROVIDER_ID);
        };

        let result = Self::classify(text, parsed);
        if result.is_accepted() {
            self.usage.record();
        }
        result
    }

    fn usage_count(&self) -> u64 {
        self.usage.get()
    }

    async fn health_check(&self) -> Result<()> {
        match self.attempt("water", Language::Hindi).await.outcome {
            super::Outcome::Unavailable => Err(ShabdkoshError::Provider(format!(
                "{} not reachable at {}",
                PROVIDER_ID, self.config.endpoint
            ))),
            _ => Ok(()),
        }
    }
}

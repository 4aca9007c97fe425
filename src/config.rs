use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, ShabdkoshError};

/// Upper bound on retries of a rate-limited or loading provider
pub const MAX_RETRIES: u32 = 1;

/// Upper bound on a single retry wait, in seconds
pub const MAX_BACKOFF_SECS: u64 = 10;

// Default values for fields that older config files may omit
fn default_max_retries() -> u32 {
    MAX_RETRIES
}

fn default_max_backoff_secs() -> u64 {
    MAX_BACKOFF_SECS
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub batch: BatchConfig,
    pub quality: QualityConfig,
    pub persistence: PersistenceConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Provider ids in order of preference, most-preferred first
    pub order: Vec<String>,
    /// Retries after a "still loading" or rate-limit response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Upper bound on any single retry wait (seconds)
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    pub sarvam: SarvamConfig,
    pub gemini: GeminiConfig,
    pub mymemory: MyMemoryConfig,
    pub local: LocalServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarvamConfig {
    pub endpoint: String,
    /// Subscription key; falls back to SARVAM_API_KEY
    pub api_key: Option<String>,
    /// Translation model; `mayura:*` covers ten languages only
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub endpoint: String,
    /// API key; falls back to GEMINI_API_KEY
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyMemoryConfig {
    pub endpoint: String,
    /// Contact address that raises the free daily quota; falls back to MYMEMORY_EMAIL
    pub email: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalServiceConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between per-language requests (milliseconds)
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Provider outputs starting with any of these are treated as failures
    pub failure_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// A batch is saved when at least `min_accepted` out of every `out_of`
    /// languages were accepted
    pub min_accepted: usize,
    pub out_of: usize,
    #[serde(default = "default_category")]
    pub default_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Location of the JSON dictionary file
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreBackend {
    /// Records kept in process memory only
    Memory,
    /// Records kept in a JSON file, rewritten atomically on insert
    JsonFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig {
                order: vec![
                    "sarvam".to_string(),
                    "gemini".to_string(),
                    "mymemory".to_string(),
                    "dictionary".to_string(),
                ],
                max_retries: default_max_retries(),
                max_backoff_secs: default_max_backoff_secs(),
                sarvam: SarvamConfig {
                    endpoint: "https://api.sarvam.ai".to_string(),
                    api_key: None,
                    model: "mayura:v1".to_string(),
                    timeout_secs: 10,
                },
                gemini: GeminiConfig {
                    endpoint: "https://generativelanguage.googleapis.com".to_string(),
                    api_key: None,
                    model: "gemini-1.5-flash".to_string(),
                    timeout_secs: 30,
                },
                mymemory: MyMemoryConfig {
                    endpoint: "https://api.mymemory.translated.net".to_string(),
                    email: None,
                    timeout_secs: 5,
                },
                local: LocalServiceConfig {
                    endpoint: "http://localhost:5000".to_string(),
                    timeout_secs: 30,
                },
            },
            batch: BatchConfig {
                request_delay_ms: 100,
            },
            quality: QualityConfig {
                failure_markers: vec!["Translation unavailable".to_string()],
            },
            persistence: PersistenceConfig {
                min_accepted: 15,
                out_of: 22,
                default_category: default_category(),
            },
            store: StoreConfig {
                backend: StoreBackend::JsonFile,
                path: PathBuf::from(".shabdkosh/dictionary.json"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ShabdkoshError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ShabdkoshError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ShabdkoshError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ShabdkoshError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Fill secrets missing from the file with environment variables
    pub fn apply_env(&mut self) {
        if self.providers.sarvam.api_key.is_none() {
            self.providers.sarvam.api_key = non_empty_env("SARVAM_API_KEY");
        }
        if self.providers.gemini.api_key.is_none() {
            self.providers.gemini.api_key = non_empty_env("GEMINI_API_KEY");
        }
        if self.providers.mymemory.email.is_none() {
            self.providers.mymemory.email = non_empty_env("MYMEMORY_EMAIL");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.persistence.out_of == 0 {
            return Err(ShabdkoshError::Config(
                "persistence.out_of must be greater than zero".to_string(),
            ));
        }
        if self.persistence.min_accepted > self.persistence.out_of {
            return Err(ShabdkoshError::Config(format!(
                "persistence.min_accepted ({}) exceeds persistence.out_of ({})",
                self.persistence.min_accepted, self.persistence.out_of
            )));
        }
        if self.providers.max_retries > MAX_RETRIES {
            return Err(ShabdkoshError::Config(format!(
                "providers.max_retries ({}) exceeds the limit of {}",
                self.providers.max_retries, MAX_RETRIES
            )));
        }
        if self.providers.max_backoff_secs > MAX_BACKOFF_SECS {
            return Err(ShabdkoshError::Config(format!(
                "providers.max_backoff_secs ({}) exceeds the limit of {}",
                self.providers.max_backoff_secs, MAX_BACKOFF_SECS
            )));
        }
        if self.providers.order.is_empty() {
            return Err(ShabdkoshError::Config(
                "providers.order must name at least one provider".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shabdkosh.toml");

        Config::default().save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();

        assert_eq!(loaded.persistence.min_accepted, 15);
        assert_eq!(loaded.persistence.out_of, 22);
        assert_eq!(loaded.batch.request_delay_ms, 100);
        assert_eq!(loaded.providers.order.first().map(String::as_str), Some("sarvam"));
        assert_eq!(loaded.store.backend, StoreBackend::JsonFile);
    }

    #[test]
    fn test_rejects_impossible_threshold() {
        let mut config = Config::default();
        config.persistence.min_accepted = 30;
        assert!(config.validate().is_err());

        config.persistence.min_accepted = 15;
        config.persistence.out_of = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unbounded_retries() {
        let mut config = Config::default();
        config.providers.max_retries = 50;
        assert!(matches!(config.validate(), Err(ShabdkoshError::Config(_))));

        config.providers.max_retries = 1;
        config.providers.max_backoff_secs = 3600;
        assert!(matches!(config.validate(), Err(ShabdkoshError::Config(_))));

        config.providers.max_backoff_secs = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_with_long_backoff_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shabdkosh.toml");
        let mut config = Config::default();
        config.providers.max_backoff_secs = 3600;
        config.save_to_file(&path).unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}

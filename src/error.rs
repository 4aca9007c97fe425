use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShabdkoshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Word store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Batch translation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ShabdkoshError>;

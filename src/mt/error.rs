/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MtError {
    /// Missing or rejected credentials, bad provider setup
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport failure talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Language code that is malformed or not accepted by the provider
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Provider answered but the translation could not be used
    #[error("Translation error: {0}")]
    TranslationError(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

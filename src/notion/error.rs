/// Error types for the content store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Missing token or unusable client setup
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The object does not exist or is not shared with the integration
    #[error("Object not found: {0}")]
    NotFound(String),
    /// The token is invalid or lacks the required capability
    #[error("Access denied: {0}")]
    Forbidden(String),
    /// Any other non-success API answer
    #[error("API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// The API answered with something that is not the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::InvalidResponse(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

/// Result type for content store operations
pub type StoreResult<T> = Result<T, StoreError>;

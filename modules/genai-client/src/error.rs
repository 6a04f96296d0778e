use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenAiError>;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned no candidates")]
    EmptyResponse,
}

impl GenAiError {
    /// Rate limits, server errors, and network failures warrant a retry;
    /// a malformed or empty response will not improve on replay.
    pub fn is_transient(&self) -> bool {
        match self {
            GenAiError::Network(_) => true,
            GenAiError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            GenAiError::Parse(_) | GenAiError::EmptyResponse => false,
        }
    }
}

impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        GenAiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GenAiError {
    fn from(err: serde_json::Error) -> Self {
        GenAiError::Parse(err.to_string())
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// The annotate call returned 200 but carried a per-image error status.
    #[error("Annotation failed: {0}")]
    Annotation(String),
}

impl VisionError {
    /// Whether a retry with backoff could plausibly succeed.
    /// Rate limits, server errors, and network failures are transient;
    /// malformed responses and annotation rejections are not.
    pub fn is_transient(&self) -> bool {
        match self {
            VisionError::Network(_) => true,
            VisionError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            VisionError::Parse(_) | VisionError::Annotation(_) => false,
        }
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        VisionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for VisionError {
    fn from(err: serde_json::Error) -> Self {
        VisionError::Parse(err.to_string())
    }
}

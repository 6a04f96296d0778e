use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl ChatError {
    /// 429 and 5xx are worth retrying; 4xx (bad recipient, revoked token)
    /// will fail identically on replay.
    pub fn is_transient(&self) -> bool {
        match self {
            ChatError::Network(_) => true,
            ChatError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Network(err.to_string())
    }
}

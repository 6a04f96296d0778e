use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapscoreError {
    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("Submission {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("Asset download failed for {locator}: {message}")]
    AssetDownload { locator: String, message: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

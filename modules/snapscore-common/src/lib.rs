pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::SnapscoreError;
pub use types::{ScoreUpdate, Submission, SubmissionStatus, UserAggregate};

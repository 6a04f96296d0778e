//! Core domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a submission. A submission is created `Pending` by the
/// upload path and flipped to `Completed` exactly once by the scoring
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Completed,
}

/// One uploaded photo and its scoring record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    /// Locator in the asset store (bucket-relative path).
    pub storage_path: String,
    pub status: SubmissionStatus,

    // Populated at completion time, never revised afterwards.
    pub expression_score: Option<f64>,
    pub theme_score: Option<u32>,
    pub total_score: Option<f64>,
    pub is_duplicate: Option<bool>,
    pub perceptual_hash: Option<String>,
    pub comment: Option<String>,
    pub scored_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// A fresh pending submission, as the upload path would create it.
    pub fn pending(
        id: impl Into<String>,
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        storage_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            storage_path: storage_path.into(),
            status: SubmissionStatus::Pending,
            expression_score: None,
            theme_score: None,
            total_score: None,
            is_duplicate: None,
            perceptual_hash: None,
            comment: None,
            scored_at: None,
            created_at: Utc::now(),
        }
    }
}

/// The fields written when a submission transitions pending → completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub expression_score: f64,
    pub theme_score: u32,
    pub total_score: f64,
    pub is_duplicate: bool,
    pub perceptual_hash: String,
    pub comment: String,
    pub face_count: u32,
    pub scored_at: DateTime<Utc>,
}

/// Per-user-per-event derived aggregate. `best_score` is monotonic
/// non-decreasing and always equals the max total score over the user's
/// completed submissions in the event; `total_uploads` counts completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAggregate {
    pub user_id: String,
    pub event_id: String,
    /// Registered display name, used in notifications.
    pub display_name: Option<String>,
    pub best_score: f64,
    pub total_uploads: u32,
}

impl UserAggregate {
    pub fn new(user_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            event_id: event_id.into(),
            display_name: None,
            best_score: 0.0,
            total_uploads: 0,
        }
    }
}

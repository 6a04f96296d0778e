//! The scoring pipeline orchestrator.
//!
//! One invocation per submission: load metadata, download the asset, fan
//! out the three analyses, join, compose, persist, notify. Retries live
//! inside the adapters; the pipeline itself never retries, and a second
//! invocation for the same submission would double-count the aggregate —
//! suppressing re-invocation is the caller's responsibility.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use snapscore_common::{SnapscoreError, Submission};

use crate::compose::{compose, ComposedScore};
use crate::expression::ExpressionAdapter;
use crate::notify::{result_message, send_best_effort, FAILURE_MESSAGE};
use crate::persist::persist_result;
use crate::retry::RetryPolicy;
use crate::simhash::{self, DEFAULT_SIMILARITY_THRESHOLD};
use crate::theme::ThemeAdapter;
use crate::traits::{
    AggregateStore, AssetStore, ChatNotifier, FaceDetector, SubmissionStore, ThemeEvaluator,
};

/// Successful pipeline outcome, returned to the caller and serialized by
/// the HTTP surface.
#[derive(Debug, Serialize)]
pub struct ScoreReport {
    pub request_id: Uuid,
    pub submission_id: String,
    pub scores: ComposedScore,
}

pub struct ScorePipeline {
    assets: Arc<dyn AssetStore>,
    submissions: Arc<dyn SubmissionStore>,
    aggregates: Arc<dyn AggregateStore>,
    detector: Arc<dyn FaceDetector>,
    evaluator: Arc<dyn ThemeEvaluator>,
    notifier: Arc<dyn ChatNotifier>,
    retry: RetryPolicy,
    similarity_threshold: u32,
}

impl ScorePipeline {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        submissions: Arc<dyn SubmissionStore>,
        aggregates: Arc<dyn AggregateStore>,
        detector: Arc<dyn FaceDetector>,
        evaluator: Arc<dyn ThemeEvaluator>,
        notifier: Arc<dyn ChatNotifier>,
    ) -> Self {
        Self {
            assets,
            submissions,
            aggregates,
            detector,
            evaluator,
            notifier,
            retry: RetryPolicy::api_default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Override the shared adapter/notifier retry budget.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: u32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Score one submission end to end. Every terminal outcome attempts a
    /// best-effort notification to the submitter.
    pub async fn score_submission(
        &self,
        submission_id: &str,
        user_id: &str,
    ) -> Result<ScoreReport, SnapscoreError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%request_id, submission_id, user_id, "scoring started");

        match self.run(request_id, submission_id).await {
            Ok(report) => {
                info!(
                    %request_id,
                    submission_id,
                    total_score = report.scores.total_score,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "scoring completed"
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    %request_id,
                    submission_id,
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "scoring failed"
                );
                send_best_effort(&*self.notifier, &self.retry, user_id, FAILURE_MESSAGE).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        request_id: Uuid,
        submission_id: &str,
    ) -> Result<ScoreReport, SnapscoreError> {
        let submission = self.load_submission(submission_id).await?;
        let user_id = submission.user_id.as_str();
        let event_id = submission.event_id.as_str();

        // Download the asset. Structural failure: no image, no score.
        let download_started = Instant::now();
        let image = self
            .assets
            .download(&submission.storage_path)
            .await
            .map_err(|err| SnapscoreError::AssetDownload {
                locator: submission.storage_path.clone(),
                message: err.to_string(),
            })?;
        info!(
            %request_id,
            bytes = image.len(),
            elapsed_ms = download_started.elapsed().as_millis() as u64,
            "asset downloaded"
        );

        // Fan out the three analyses and join on all of them — no partial
        // composition. The hash is CPU-bound, so it runs off the reactor.
        let analysis_started = Instant::now();
        let expression_adapter = ExpressionAdapter::new(&*self.detector, self.retry);
        let theme_adapter = ThemeAdapter::new(&*self.evaluator, self.retry);
        let hash_bytes = image.clone();
        let (expression, theme, hash) = tokio::join!(
            expression_adapter.analyze(&image),
            theme_adapter.evaluate(&image),
            async {
                tokio::task::spawn_blocking(move || simhash::average_hash(&hash_bytes))
                    .await
                    .unwrap_or_else(|err| {
                        warn!(error = %err, "hash task panicked, emitting sentinel");
                        "error_0000".to_string()
                    })
            }
        );
        info!(
            %request_id,
            expression_score = expression.score(),
            theme_score = theme.score(),
            elapsed_ms = analysis_started.elapsed().as_millis() as u64,
            "analysis fan-out joined"
        );

        // Near-duplicate check against the user's completed submissions.
        // Hash-history failures degrade to "no history" rather than block.
        let existing = match self.submissions.completed_hashes(event_id, user_id).await {
            Ok(hashes) => hashes,
            Err(err) => {
                warn!(%request_id, error = %err, "hash history unavailable, skipping dedup");
                Vec::new()
            }
        };
        let is_duplicate = simhash::is_similar(&hash, &existing, self.similarity_threshold);
        info!(%request_id, is_duplicate, compared = existing.len(), "similarity check complete");

        let composed = compose(&expression, &theme, is_duplicate, hash);
        if composed.has_errors() {
            warn!(%request_id, errors = ?composed.errors, "score composed with adapter errors");
        }

        persist_result(
            &*self.submissions,
            &*self.aggregates,
            submission_id,
            user_id,
            event_id,
            &composed,
        )
        .await?;

        send_best_effort(
            &*self.notifier,
            &self.retry,
            user_id,
            &result_message(&composed),
        )
        .await;

        Ok(ScoreReport {
            request_id,
            submission_id: submission_id.to_string(),
            scores: composed,
        })
    }

    async fn load_submission(&self, submission_id: &str) -> Result<Submission, SnapscoreError> {
        let submission = self
            .submissions
            .get(submission_id)
            .await
            .map_err(SnapscoreError::Anyhow)?
            .ok_or_else(|| SnapscoreError::SubmissionNotFound(submission_id.to_string()))?;

        if submission.storage_path.is_empty() {
            return Err(SnapscoreError::MissingField {
                id: submission_id.to_string(),
                field: "storage_path",
            });
        }
        if submission.user_id.is_empty() {
            return Err(SnapscoreError::MissingField {
                id: submission_id.to_string(),
                field: "user_id",
            });
        }
        Ok(submission)
    }
}

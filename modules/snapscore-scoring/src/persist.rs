//! Result persistence and the per-user aggregate update.
//!
//! Two writes with different severities: the submission completion is the
//! source of truth and its failure is fatal to the pipeline; the aggregate
//! is a derived cache updated best-effort inside the store's transaction —
//! a failure there is logged for monitoring but never fails the request.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::compose::ComposedScore;
use crate::traits::{AggregateStore, SubmissionStore};

/// Persist a composed result: complete the submission, then fold the total
/// into the user's aggregate.
pub async fn persist_result(
    submissions: &dyn SubmissionStore,
    aggregates: &dyn AggregateStore,
    submission_id: &str,
    user_id: &str,
    event_id: &str,
    composed: &ComposedScore,
) -> Result<()> {
    let update = composed.to_update();
    submissions
        .complete(submission_id, &update)
        .await
        .with_context(|| format!("failed to complete submission {submission_id}"))?;
    info!(submission_id, total_score = composed.total_score, "submission completed");

    let total_score = composed.total_score;
    let outcome = aggregates
        .transact(
            user_id,
            event_id,
            Box::new(move |agg| {
                // CAS-style inside the transaction: read best, write max.
                agg.best_score = agg.best_score.max(total_score);
                agg.total_uploads += 1;
            }),
        )
        .await;

    match outcome {
        Ok(Some(agg)) => {
            info!(
                user_id,
                best_score = agg.best_score,
                total_uploads = agg.total_uploads,
                "user aggregate updated"
            );
        }
        Ok(None) => {
            warn!(user_id, event_id, "no aggregate row for user, skipping update");
        }
        Err(err) => {
            // Submission write already succeeded; the aggregate is derived
            // state and can be rebuilt, so don't fail the request.
            error!(user_id, error = %err, "aggregate update failed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;

    use snapscore_common::{Submission, UserAggregate};

    use crate::expression::ExpressionResult;
    use crate::store::{MemoryAggregateStore, MemorySubmissionStore};
    use crate::theme::ThemeResult;
    use crate::traits::AggregateFn;

    fn composed(total: f64) -> ComposedScore {
        let expression = ExpressionResult::Scored {
            score: total,
            face_count: 1,
            smiling_faces: 1,
        };
        let theme = ThemeResult::Scored {
            score: 100,
            comment: "x".to_string(),
        };
        crate::compose::compose(&expression, &theme, false, "hash".to_string())
    }

    #[tokio::test]
    async fn best_score_is_monotonic_in_either_order() {
        let submissions = MemorySubmissionStore::new();
        let aggregates = MemoryAggregateStore::new();
        aggregates.insert(UserAggregate::new("u1", "e1"));

        for (id, score) in [("s1", 100.0), ("s2", 80.0)] {
            submissions.insert(Submission::pending(id, "u1", "e1", "p"));
            persist_result(&submissions, &aggregates, id, "u1", "e1", &composed(score))
                .await
                .unwrap();
        }

        let agg = aggregates.get("u1", "e1").await.unwrap().unwrap();
        assert_eq!(agg.best_score, 100.0);
        assert_eq!(agg.total_uploads, 2);

        // Same totals, reversed arrival order.
        let submissions = MemorySubmissionStore::new();
        let aggregates = MemoryAggregateStore::new();
        aggregates.insert(UserAggregate::new("u1", "e1"));
        for (id, score) in [("s1", 80.0), ("s2", 100.0)] {
            submissions.insert(Submission::pending(id, "u1", "e1", "p"));
            persist_result(&submissions, &aggregates, id, "u1", "e1", &composed(score))
                .await
                .unwrap();
        }
        let agg = aggregates.get("u1", "e1").await.unwrap().unwrap();
        assert_eq!(agg.best_score, 100.0);
        assert_eq!(agg.total_uploads, 2);
    }

    #[tokio::test]
    async fn submission_write_failure_is_fatal() {
        // Empty store: complete() fails because the submission is unknown.
        let submissions = MemorySubmissionStore::new();
        let aggregates = MemoryAggregateStore::new();

        let result =
            persist_result(&submissions, &aggregates, "ghost", "u1", "e1", &composed(50.0)).await;
        assert!(result.is_err());
    }

    struct FailingAggregateStore;

    #[async_trait]
    impl AggregateStore for FailingAggregateStore {
        async fn transact(
            &self,
            _user_id: &str,
            _event_id: &str,
            _apply: AggregateFn,
        ) -> Result<Option<UserAggregate>> {
            Err(anyhow!("aggregate store unavailable"))
        }

        async fn get(&self, _user_id: &str, _event_id: &str) -> Result<Option<UserAggregate>> {
            Err(anyhow!("aggregate store unavailable"))
        }
    }

    #[tokio::test]
    async fn aggregate_failure_is_swallowed() {
        let submissions = MemorySubmissionStore::new();
        submissions.insert(Submission::pending("s1", "u1", "e1", "p"));

        let result = persist_result(
            &submissions,
            &FailingAggregateStore,
            "s1",
            "u1",
            "e1",
            &composed(50.0),
        )
        .await;

        // Submission write succeeded, so the request succeeds.
        assert!(result.is_ok());
        let snap = submissions.snapshot("s1").unwrap();
        assert_eq!(snap.total_score, Some(50.0));
    }

    #[tokio::test]
    async fn missing_aggregate_row_is_skipped_not_fatal() {
        let submissions = MemorySubmissionStore::new();
        submissions.insert(Submission::pending("s1", "u1", "e1", "p"));
        let aggregates = MemoryAggregateStore::new();

        persist_result(&submissions, &aggregates, "s1", "u1", "e1", &composed(50.0))
            .await
            .unwrap();
    }
}

//! In-memory store implementations.
//!
//! The production deployment backs these traits with the document store;
//! the in-memory versions serve tests and dev runs. Thread-safe, with the
//! aggregate transact holding its lock across the read-modify-write so it
//! is a true compare-and-swap under concurrent submissions.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;

use snapscore_common::{ScoreUpdate, Submission, SubmissionStatus, UserAggregate};

use crate::traits::{AggregateFn, AggregateStore, AssetStore, SubmissionStore};

// ---------------------------------------------------------------------------
// MemoryAssetStore
// ---------------------------------------------------------------------------

/// Locator → bytes map. Unregistered locators fail like a missing object.
#[derive(Default)]
pub struct MemoryAssetStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, locator: &str, bytes: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert(locator.to_string(), bytes.into());
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn download(&self, locator: &str) -> Result<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or_else(|| anyhow!("object not found: {locator}"))
    }
}

// ---------------------------------------------------------------------------
// MemorySubmissionStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySubmissionStore {
    submissions: Mutex<HashMap<String, Submission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, submission: Submission) {
        self.submissions
            .lock()
            .unwrap()
            .insert(submission.id.clone(), submission);
    }

    /// Snapshot of a submission (for test assertions).
    pub fn snapshot(&self, id: &str) -> Option<Submission> {
        self.submissions.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn get(&self, id: &str) -> Result<Option<Submission>> {
        Ok(self.submissions.lock().unwrap().get(id).cloned())
    }

    async fn complete(&self, id: &str, update: &ScoreUpdate) -> Result<()> {
        let mut submissions = self.submissions.lock().unwrap();
        let submission = submissions
            .get_mut(id)
            .ok_or_else(|| anyhow!("submission not found: {id}"))?;
        submission.status = SubmissionStatus::Completed;
        submission.expression_score = Some(update.expression_score);
        submission.theme_score = Some(update.theme_score);
        submission.total_score = Some(update.total_score);
        submission.is_duplicate = Some(update.is_duplicate);
        submission.perceptual_hash = Some(update.perceptual_hash.clone());
        submission.comment = Some(update.comment.clone());
        submission.scored_at = Some(update.scored_at);
        Ok(())
    }

    async fn completed_hashes(&self, event_id: &str, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .values()
            .filter(|s| {
                s.event_id == event_id
                    && s.user_id == user_id
                    && s.status == SubmissionStatus::Completed
            })
            .filter_map(|s| s.perceptual_hash.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryAggregateStore
// ---------------------------------------------------------------------------

/// Keyed by (user, event). `transact` applies the closure under the store
/// lock, so the read-modify-write is atomic.
#[derive(Default)]
pub struct MemoryAggregateStore {
    aggregates: Mutex<HashMap<(String, String), UserAggregate>>,
}

impl MemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, aggregate: UserAggregate) {
        self.aggregates.lock().unwrap().insert(
            (aggregate.user_id.clone(), aggregate.event_id.clone()),
            aggregate,
        );
    }
}

#[async_trait]
impl AggregateStore for MemoryAggregateStore {
    async fn transact(
        &self,
        user_id: &str,
        event_id: &str,
        apply: AggregateFn,
    ) -> Result<Option<UserAggregate>> {
        let mut aggregates = self.aggregates.lock().unwrap();
        match aggregates.get_mut(&(user_id.to_string(), event_id.to_string())) {
            Some(aggregate) => {
                apply(aggregate);
                Ok(Some(aggregate.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get(&self, user_id: &str, event_id: &str) -> Result<Option<UserAggregate>> {
        Ok(self
            .aggregates
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), event_id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_hashes_filters_by_event_user_and_status() {
        let store = MemorySubmissionStore::new();

        let mut done = Submission::pending("s1", "u1", "e1", "p1");
        done.status = SubmissionStatus::Completed;
        done.perceptual_hash = Some("aaaa".to_string());
        store.insert(done);

        // Pending: excluded even with a hash.
        let mut pending = Submission::pending("s2", "u1", "e1", "p2");
        pending.perceptual_hash = Some("bbbb".to_string());
        store.insert(pending);

        // Other user: excluded.
        let mut other = Submission::pending("s3", "u2", "e1", "p3");
        other.status = SubmissionStatus::Completed;
        other.perceptual_hash = Some("cccc".to_string());
        store.insert(other);

        let hashes = store.completed_hashes("e1", "u1").await.unwrap();
        assert_eq!(hashes, vec!["aaaa".to_string()]);
    }

    #[tokio::test]
    async fn transact_on_missing_aggregate_returns_none() {
        let store = MemoryAggregateStore::new();
        let result = store
            .transact("ghost", "e1", Box::new(|agg| agg.total_uploads += 1))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn transact_applies_atomically_under_contention() {
        use std::sync::Arc;

        let store = Arc::new(MemoryAggregateStore::new());
        store.insert(UserAggregate::new("u1", "e1"));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .transact("u1", "e1", Box::new(|agg| agg.total_uploads += 1))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let agg = store.get("u1", "e1").await.unwrap().unwrap();
        assert_eq!(agg.total_uploads, 20);
    }
}

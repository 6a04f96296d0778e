// Trait abstractions for the scoring pipeline's collaborators.
//
// FaceDetector / ThemeEvaluator / ChatNotifier wrap the three external
// services; AssetStore / SubmissionStore / AggregateStore are the documented
// read/write contracts of the document store. The pipeline only ever sees
// these traits, so tests run with in-process mocks: no network, no emulator.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use chatbot_client::{ChatClient, ChatError};
use genai_client::{GenAiClient, GenAiError};
use snapscore_common::{ScoreUpdate, Submission, UserAggregate};
use vision_client::{FaceAnnotation, VisionClient, VisionError};

// ---------------------------------------------------------------------------
// External analysis services
// ---------------------------------------------------------------------------

#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces with joy likelihoods and bounding polys.
    async fn detect_faces(&self, image: &[u8]) -> std::result::Result<Vec<FaceAnnotation>, VisionError>;
}

#[async_trait]
pub trait ThemeEvaluator: Send + Sync {
    /// Send an image plus rubric prompt, return the model's raw text.
    async fn describe_image(&self, image: &[u8], prompt: &str) -> std::result::Result<String, GenAiError>;
}

#[async_trait]
pub trait ChatNotifier: Send + Sync {
    /// Push one text message to a recipient.
    async fn push(&self, recipient: &str, text: &str) -> std::result::Result<(), ChatError>;
}

#[async_trait]
impl FaceDetector for VisionClient {
    async fn detect_faces(&self, image: &[u8]) -> std::result::Result<Vec<FaceAnnotation>, VisionError> {
        VisionClient::detect_faces(self, image).await
    }
}

#[async_trait]
impl ThemeEvaluator for GenAiClient {
    async fn describe_image(&self, image: &[u8], prompt: &str) -> std::result::Result<String, GenAiError> {
        GenAiClient::describe_image(self, image, prompt).await
    }
}

#[async_trait]
impl ChatNotifier for ChatClient {
    async fn push(&self, recipient: &str, text: &str) -> std::result::Result<(), ChatError> {
        ChatClient::push(self, recipient, text).await
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Download the raw bytes behind a storage locator.
    async fn download(&self, locator: &str) -> Result<Bytes>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Fetch a submission record by id.
    async fn get(&self, id: &str) -> Result<Option<Submission>>;

    /// Flip a submission to completed with all computed fields.
    /// One-shot: the pipeline calls this exactly once per submission.
    async fn complete(&self, id: &str, update: &ScoreUpdate) -> Result<()>;

    /// Perceptual hashes of the user's *completed* submissions in an event,
    /// for the near-duplicate check.
    async fn completed_hashes(&self, event_id: &str, user_id: &str) -> Result<Vec<String>>;
}

/// Mutation applied to an aggregate inside one atomic read-modify-write.
pub type AggregateFn = Box<dyn FnOnce(&mut UserAggregate) + Send>;

#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Run `apply` against the (user, event) aggregate inside a transaction.
    ///
    /// The store reads the current row, applies the closure, and writes the
    /// result as one atomic unit — never a blind increment, so concurrent
    /// submissions by the same user cannot lose updates. Returns the updated
    /// aggregate, or `None` when no row exists for the key.
    async fn transact(
        &self,
        user_id: &str,
        event_id: &str,
        apply: AggregateFn,
    ) -> Result<Option<UserAggregate>>;

    /// Read the current aggregate, if any.
    async fn get(&self, user_id: &str, event_id: &str) -> Result<Option<UserAggregate>>;
}

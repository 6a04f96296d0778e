//! The photo-contest scoring core.
//!
//! One pipeline invocation per submission: three independent external
//! analyses (expression detection, theme evaluation, perceptual hashing)
//! fan out concurrently, join, and fold into a single deterministic score
//! with per-adapter retry and fallback policies. Shared per-user state is
//! only ever touched through the aggregate store's transaction.

pub mod compose;
pub mod expression;
pub mod notify;
pub mod persist;
pub mod pipeline;
pub mod retry;
pub mod simhash;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod theme;
pub mod traits;

pub use compose::{compose, ComposedScore, DUPLICATE_PENALTY};
pub use expression::{ExpressionAdapter, ExpressionResult};
pub use pipeline::{ScorePipeline, ScoreReport};
pub use retry::RetryPolicy;
pub use simhash::{average_hash, is_similar, DEFAULT_SIMILARITY_THRESHOLD};
pub use store::{MemoryAggregateStore, MemoryAssetStore, MemorySubmissionStore};
pub use theme::{ThemeAdapter, ThemeResult};
pub use traits::{
    AggregateFn, AggregateStore, AssetStore, ChatNotifier, FaceDetector, SubmissionStore,
    ThemeEvaluator,
};

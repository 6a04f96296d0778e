//! Thin HTTP surface over the scoring pipeline.
//!
//! One operational route: `POST /score` with `{submission_id, user_id}`.
//! Everything interesting happens in `snapscore-scoring`; this binary wires
//! clients and stores together and translates results to JSON.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatbot_client::ChatClient;
use genai_client::GenAiClient;
use snapscore_common::Config;
use snapscore_scoring::{
    MemoryAggregateStore, MemoryAssetStore, MemorySubmissionStore, ScorePipeline,
};
use vision_client::VisionClient;

struct AppState {
    pipeline: ScorePipeline,
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    submission_id: Option<String>,
    user_id: Option<String>,
}

async fn score_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreRequest>,
) -> (StatusCode, Json<Value>) {
    let (submission_id, user_id) = match (request.submission_id, request.user_id) {
        (Some(s), Some(u)) if !s.is_empty() && !u.is_empty() => (s, u),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing submission_id or user_id" })),
            );
        }
    };

    match state.pipeline.score_submission(&submission_id, &user_id).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "submission_id": report.submission_id,
                "scores": report.scores,
                "request_id": report.request_id,
            })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "submission_id": submission_id,
                "error": err.to_string(),
            })),
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("snapscore=info".parse()?))
        .init();

    let config = Config::from_env();

    let detector = VisionClient::new(&config.vision_api_key).with_base_url(&config.vision_api_url);
    let evaluator = GenAiClient::new(&config.genai_api_key, &config.genai_model)
        .with_base_url(&config.genai_api_url);
    let notifier =
        ChatClient::new(&config.chat_channel_token).with_base_url(&config.chat_api_url);

    // Store wiring for local/dev runs; production swaps in the document
    // store behind the same traits.
    let pipeline = ScorePipeline::new(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySubmissionStore::new()),
        Arc::new(MemoryAggregateStore::new()),
        Arc::new(detector),
        Arc::new(evaluator),
        Arc::new(notifier),
    );

    let state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .route("/score", post(score_handler))
        .route("/", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!(%addr, event_id = %config.current_event_id, "scoring server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

//! Theme adapter: generative rubric evaluation of a submission.
//!
//! Sends the image with a fixed rubric prompt and parses a strict JSON
//! `{score, comment}` reply. Malformed replies are never retried — a parse
//! failure is deterministic for a given response — and fall back to the
//! neutral score immediately. Transient API failures share the adapters'
//! common retry budget and degrade to the same neutral score on exhaustion.

use serde::Deserialize;
use tracing::info;

use genai_client::{util::strip_code_blocks, GenAiError};

use crate::retry::RetryPolicy;
use crate::traits::ThemeEvaluator;

/// Neutral score applied whenever the evaluator cannot be trusted.
pub const NEUTRAL_THEME_SCORE: u32 = 50;

pub const PARSE_FALLBACK_COMMENT: &str =
    "The AI evaluation could not be read. A default score has been applied.";
pub const API_FALLBACK_COMMENT: &str =
    "The AI evaluation hit an error. A default score has been applied.";

const RUBRIC_PROMPT: &str = r#"You are an event-photography judge for a photo contest. Analyze the provided photo and rate how well it captures the moment, using these criteria:

## What to evaluate
- The expressions of everyone visible in the photo
- For group shots, the overall mood as well

## Scoring rubric (out of 100)
1. Naturalness (30 points)
   - Genuine expressions rather than forced smiles
   - Relaxed, unposed feel
2. Joy (40 points)
   - Pure delight coming through
   - Smiling eyes, warm expressions
3. Harmony (30 points)
   - Expressions in tune with the people around them
   - A unified mood across the whole group

## Comment guidance
- Suggest one concrete improvement if there is one
- Call out what is especially strong
- Be encouraging; avoid negative phrasing
- Respect privacy: do not guess at identities or relationships

## Output
Return JSON with keys "score" and "comment". Output JSON only.

Example:
{
  "score": 85,
  "comment": "The genuine delight in everyone's eyes stands out, and the group feels wonderfully in sync."
}"#;

/// What went wrong when the theme evaluation fell back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeFailure {
    ParseFailed,
    ApiFailed,
}

impl ThemeFailure {
    pub fn tag(self) -> &'static str {
        match self {
            ThemeFailure::ParseFailed => "genai_parse_failed",
            ThemeFailure::ApiFailed => "genai_api_failed",
        }
    }
}

/// Outcome of the theme evaluation. Fallbacks carry the neutral score so a
/// broken evaluator neither rewards nor punishes a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeResult {
    Scored { score: u32, comment: String },
    Fallback { kind: ThemeFailure },
}

impl ThemeResult {
    pub fn score(&self) -> u32 {
        match self {
            ThemeResult::Scored { score, .. } => *score,
            ThemeResult::Fallback { .. } => NEUTRAL_THEME_SCORE,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            ThemeResult::Scored { comment, .. } => comment,
            ThemeResult::Fallback {
                kind: ThemeFailure::ParseFailed,
            } => PARSE_FALLBACK_COMMENT,
            ThemeResult::Fallback {
                kind: ThemeFailure::ApiFailed,
            } => API_FALLBACK_COMMENT,
        }
    }

    pub fn error_tag(&self) -> Option<&'static str> {
        match self {
            ThemeResult::Scored { .. } => None,
            ThemeResult::Fallback { kind } => Some(kind.tag()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RubricReply {
    score: f64,
    comment: String,
}

/// Parse a model reply into a theme result. Tolerates markdown fences;
/// anything else malformed is a parse fallback.
pub fn parse_reply(raw: &str) -> ThemeResult {
    let stripped = strip_code_blocks(raw);
    match serde_json::from_str::<RubricReply>(stripped) {
        Ok(reply) => ThemeResult::Scored {
            score: (reply.score.round().max(0.0) as u32).min(100),
            comment: reply.comment,
        },
        Err(err) => {
            info!(error = %err, "rubric reply was not valid JSON, using neutral score");
            ThemeResult::Fallback {
                kind: ThemeFailure::ParseFailed,
            }
        }
    }
}

pub struct ThemeAdapter<'a> {
    evaluator: &'a dyn ThemeEvaluator,
    retry: RetryPolicy,
}

impl<'a> ThemeAdapter<'a> {
    pub fn new(evaluator: &'a dyn ThemeEvaluator, retry: RetryPolicy) -> Self {
        Self { evaluator, retry }
    }

    /// Evaluate theme relevance. Never errors: every failure mode lands on
    /// the neutral score with a tagged fallback.
    pub async fn evaluate(&self, image: &[u8]) -> ThemeResult {
        let reply = self
            .retry
            .run("theme_evaluation", GenAiError::is_transient, || {
                self.evaluator.describe_image(image, RUBRIC_PROMPT)
            })
            .await;

        match reply {
            Ok(text) => {
                let result = parse_reply(&text);
                if let ThemeResult::Scored { score, .. } = &result {
                    info!(score, "theme evaluation complete");
                }
                result
            }
            Err(err) => {
                info!(error = %err, "theme evaluation failed, using neutral score");
                ThemeResult::Fallback {
                    kind: ThemeFailure::ApiFailed,
                }
            }
        }
    }
}

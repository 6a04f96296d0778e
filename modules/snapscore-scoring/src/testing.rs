// Test mocks for the scoring pipeline.
//
// One mock per external-service trait boundary:
// - MockDetector (FaceDetector) — scripted annotations or failures
// - MockEvaluator (ThemeEvaluator) — scripted reply text or failures
// - RecordingNotifier (ChatNotifier) — captures pushes for assertions
//
// Stores use the real in-memory implementations from `store`. Plus helpers
// for building test images, faces, and a fast retry policy so failure
// scenarios don't sleep through real backoff.

use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

use chatbot_client::ChatError;
use genai_client::GenAiError;
use vision_client::{BoundingPoly, FaceAnnotation, Likelihood, Vertex, VisionError};

use crate::retry::RetryPolicy;
use crate::traits::{ChatNotifier, FaceDetector, ThemeEvaluator};

/// Millisecond-scale retry budget for tests exercising failure paths.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

// ---------------------------------------------------------------------------
// Image + annotation fixtures
// ---------------------------------------------------------------------------

/// A solid-color PNG, decodable by both the dimension probe and the hasher.
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// A face annotation with an axis-aligned box of the given size at origin.
pub fn face(joy: Likelihood, width: i64, height: i64) -> FaceAnnotation {
    FaceAnnotation {
        joy_likelihood: joy,
        bounding_poly: BoundingPoly {
            vertices: vec![
                Vertex { x: 0, y: 0 },
                Vertex { x: width, y: 0 },
                Vertex { x: width, y: height },
                Vertex { x: 0, y: height },
            ],
        },
    }
}

// ---------------------------------------------------------------------------
// MockDetector
// ---------------------------------------------------------------------------

enum DetectorScript {
    Faces(Vec<FaceAnnotation>),
    FailPermanent,
    FailTransient,
}

/// Scripted face detector.
pub struct MockDetector {
    script: DetectorScript,
    calls: Mutex<u32>,
}

impl MockDetector {
    pub fn returning(faces: Vec<FaceAnnotation>) -> Self {
        Self {
            script: DetectorScript::Faces(faces),
            calls: Mutex::new(0),
        }
    }

    /// Fails every call with a non-retryable API error.
    pub fn always_failing() -> Self {
        Self {
            script: DetectorScript::FailPermanent,
            calls: Mutex::new(0),
        }
    }

    /// Fails every call with a retryable 503, to exercise retry exhaustion.
    pub fn always_transient() -> Self {
        Self {
            script: DetectorScript::FailTransient,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl FaceDetector for MockDetector {
    async fn detect_faces(&self, _image: &[u8]) -> Result<Vec<FaceAnnotation>, VisionError> {
        *self.calls.lock().unwrap() += 1;
        match &self.script {
            DetectorScript::Faces(faces) => Ok(faces.clone()),
            DetectorScript::FailPermanent => Err(VisionError::Api {
                status: 400,
                message: "invalid image".to_string(),
            }),
            DetectorScript::FailTransient => Err(VisionError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MockEvaluator
// ---------------------------------------------------------------------------

enum EvaluatorScript {
    Reply(String),
    FailPermanent,
    FailTransient,
}

/// Scripted theme evaluator.
pub struct MockEvaluator {
    script: EvaluatorScript,
}

impl MockEvaluator {
    /// Returns the given raw reply text on every call.
    pub fn returning(reply: &str) -> Self {
        Self {
            script: EvaluatorScript::Reply(reply.to_string()),
        }
    }

    /// A well-formed `{score, comment}` reply.
    pub fn scoring(score: u32, comment: &str) -> Self {
        Self::returning(&format!(
            "{{\"score\": {score}, \"comment\": \"{comment}\"}}"
        ))
    }

    pub fn always_failing() -> Self {
        Self {
            script: EvaluatorScript::FailPermanent,
        }
    }

    pub fn always_transient() -> Self {
        Self {
            script: EvaluatorScript::FailTransient,
        }
    }
}

#[async_trait]
impl ThemeEvaluator for MockEvaluator {
    async fn describe_image(&self, _image: &[u8], _prompt: &str) -> Result<String, GenAiError> {
        match &self.script {
            EvaluatorScript::Reply(text) => Ok(text.clone()),
            EvaluatorScript::FailPermanent => Err(GenAiError::Api {
                status: 400,
                message: "bad request".to_string(),
            }),
            EvaluatorScript::FailTransient => Err(GenAiError::Api {
                status: 429,
                message: "rate limited".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// Records every push; optionally fails them all (non-retryably).
#[derive(Default)]
pub struct RecordingNotifier {
    pushes: Mutex<Vec<(String, String)>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// All (recipient, text) pairs pushed so far.
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatNotifier for RecordingNotifier {
    async fn push(&self, recipient: &str, text: &str) -> Result<(), ChatError> {
        self.pushes
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        if self.failing {
            return Err(ChatError::Api {
                status: 403,
                message: "blocked".to_string(),
            });
        }
        Ok(())
    }
}

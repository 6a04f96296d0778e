//! HTTP client for the face/expression detection service.
//!
//! One call: [`VisionClient::detect_faces`] — image bytes in, face
//! annotations (joy likelihood + bounding poly) out. Callers decide retry
//! policy; [`VisionError::is_transient`] classifies failures for them.

pub mod error;
pub mod types;

pub use error::{Result, VisionError};
pub use types::{BoundingPoly, FaceAnnotation, Likelihood, Vertex};

use base64::Engine;
use tracing::debug;

use types::{AnnotateImageRequest, AnnotateRequest, AnnotateResponse, Feature, ImageContent};

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";

/// Max faces requested per annotate call. Large group shots at a venue
/// rarely exceed this; the detector caps its own output anyway.
const MAX_FACE_RESULTS: u32 = 50;

pub struct VisionClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VisionClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Run face detection on raw image bytes.
    pub async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceAnnotation>> {
        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    feature_type: "FACE_DETECTION",
                    max_results: MAX_FACE_RESULTS,
                }],
            }],
        };

        let url = format!("{}/v1/images:annotate?key={}", self.base_url, self.api_key);
        debug!(image_bytes = image.len(), "face detection request");

        let resp = self.http.post(&url).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let annotate: AnnotateResponse = resp.json().await?;
        let image_resp = annotate.responses.into_iter().next().unwrap_or_default();

        if let Some(err) = image_resp.error {
            return Err(VisionError::Annotation(err.message));
        }

        Ok(image_resp.face_annotations)
    }
}

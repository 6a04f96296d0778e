//! Expression adapter: joy-likelihood scoring with face-size adjustment.
//!
//! Each face at or above the Likely threshold contributes a base score from
//! the likelihood table, scaled by how much of the frame the face occupies.
//! Close-up shots keep full weight; faces in large group shots are
//! discounted down to a floor so a crowd of tiny smiles cannot swamp a
//! genuine close-up.

use image::GenericImageView;
use tracing::{debug, info};

use vision_client::{FaceAnnotation, Likelihood, VisionError};

use crate::retry::RetryPolicy;
use crate::traits::FaceDetector;

/// Floor multiplier for distant faces (<1% of frame area).
const SIZE_FLOOR: f64 = 0.4;

/// Error tag surfaced in the submission comment and logs.
pub const EXPRESSION_ERROR_TAG: &str = "vision_api_failed";

/// Outcome of the expression analysis. `Failed` scores exactly zero —
/// an API failure must not award estimated points in a ranked contest.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionResult {
    Scored {
        score: f64,
        face_count: u32,
        smiling_faces: u32,
    },
    Failed,
}

impl ExpressionResult {
    pub fn score(&self) -> f64 {
        match self {
            ExpressionResult::Scored { score, .. } => *score,
            ExpressionResult::Failed => 0.0,
        }
    }

    pub fn face_count(&self) -> u32 {
        match self {
            ExpressionResult::Scored { face_count, .. } => *face_count,
            ExpressionResult::Failed => 0,
        }
    }

    pub fn smiling_faces(&self) -> u32 {
        match self {
            ExpressionResult::Scored { smiling_faces, .. } => *smiling_faces,
            ExpressionResult::Failed => 0,
        }
    }

    pub fn error_tag(&self) -> Option<&'static str> {
        match self {
            ExpressionResult::Scored { .. } => None,
            ExpressionResult::Failed => Some(EXPRESSION_ERROR_TAG),
        }
    }
}

/// Base score for a joy likelihood level.
pub fn likelihood_score(likelihood: Likelihood) -> f64 {
    match likelihood {
        Likelihood::VeryLikely => 95.0,
        Likelihood::Likely => 75.0,
        Likelihood::Possible => 50.0,
        Likelihood::Unlikely => 25.0,
        Likelihood::VeryUnlikely => 5.0,
        Likelihood::Unknown => 0.0,
    }
}

/// Size multiplier from the face's share of the frame.
///
/// Authoritative bands:
/// - >=5% (close-up, 2-3 people): 1.0
/// - 2-5% (4-8 person group): 0.7..1.0, linear
/// - 1-2% (10+ person group): 0.4..0.7, linear
/// - <1% (distant crowd): 0.4
pub fn size_multiplier(face: &FaceAnnotation, image_width: u32, image_height: u32) -> f64 {
    let image_area = f64::from(image_width) * f64::from(image_height);
    if image_area <= 0.0 {
        return SIZE_FLOOR;
    }
    let relative = face.bounding_poly.area() as f64 / image_area;

    if relative >= 0.05 {
        1.0
    } else if relative >= 0.02 {
        0.7 + (relative - 0.02) / (0.05 - 0.02) * 0.3
    } else if relative >= 0.01 {
        0.4 + (relative - 0.01) / (0.02 - 0.01) * 0.3
    } else {
        SIZE_FLOOR
    }
}

/// Sum of size-adjusted likelihood scores over faces meeting the Likely bar.
fn score_faces(faces: &[FaceAnnotation], width: u32, height: u32) -> ExpressionResult {
    let mut total = 0.0;
    let mut smiling = 0u32;

    for face in faces {
        if face.joy_likelihood < Likelihood::Likely {
            continue;
        }
        let base = likelihood_score(face.joy_likelihood);
        let multiplier = size_multiplier(face, width, height);
        total += base * multiplier;
        smiling += 1;
        debug!(joy = ?face.joy_likelihood, base, multiplier, "face scored");
    }

    ExpressionResult::Scored {
        score: (total * 100.0).round() / 100.0,
        face_count: faces.len() as u32,
        smiling_faces: smiling,
    }
}

pub struct ExpressionAdapter<'a> {
    detector: &'a dyn FaceDetector,
    retry: RetryPolicy,
}

impl<'a> ExpressionAdapter<'a> {
    pub fn new(detector: &'a dyn FaceDetector, retry: RetryPolicy) -> Self {
        Self { detector, retry }
    }

    /// Analyze expressions in an image. Never errors: transient detector
    /// failures are retried, everything else degrades to `Failed` (zero).
    pub async fn analyze(&self, image: &[u8]) -> ExpressionResult {
        let (width, height) = match image::load_from_memory(image) {
            Ok(img) => img.dimensions(),
            Err(err) => {
                info!(error = %err, "image decode failed, zero expression score");
                return ExpressionResult::Failed;
            }
        };

        let detected = self
            .retry
            .run("face_detection", VisionError::is_transient, || {
                self.detector.detect_faces(image)
            })
            .await;

        match detected {
            Ok(faces) => {
                let result = score_faces(&faces, width, height);
                info!(
                    smiling = result.smiling_faces(),
                    faces = result.face_count(),
                    score = result.score(),
                    "smile detection complete"
                );
                result
            }
            Err(err) => {
                info!(error = %err, "face detection failed, zero expression score");
                ExpressionResult::Failed
            }
        }
    }
}

use serde::{Deserialize, Serialize};

/// Detector confidence levels, ordered weakest to strongest so that
/// `likelihood >= Likelihood::Likely` reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Axis-aligned area of the polygon's bounding box, in pixels.
    pub fn area(&self) -> i64 {
        let xs = self.vertices.iter().map(|v| v.x);
        let ys = self.vertices.iter().map(|v| v.y);
        let width = xs.clone().max().unwrap_or(0) - xs.min().unwrap_or(0);
        let height = ys.clone().max().unwrap_or(0) - ys.min().unwrap_or(0);
        width.max(0) * height.max(0)
    }
}

/// One detected face.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    #[serde(default)]
    pub joy_likelihood: Likelihood,
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

// --- Wire shapes for images:annotate ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageContent {
    /// Base64-encoded image bytes.
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Feature {
    #[serde(rename = "type")]
    pub feature_type: &'static str,
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateImageResponse {
    #[serde(default)]
    pub face_annotations: Vec<FaceAnnotation>,
    pub error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStatus {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn likelihood_ordering_matches_confidence() {
        assert!(Likelihood::VeryLikely > Likelihood::Likely);
        assert!(Likelihood::Likely > Likelihood::Possible);
        assert!(Likelihood::Unknown < Likelihood::VeryUnlikely);
    }

    #[test]
    fn likelihood_parses_screaming_snake() {
        let l: Likelihood = serde_json::from_str("\"VERY_LIKELY\"").unwrap();
        assert_eq!(l, Likelihood::VeryLikely);
    }

    #[test]
    fn bounding_poly_area_from_vertices() {
        let poly = BoundingPoly {
            vertices: vec![
                Vertex { x: 10, y: 20 },
                Vertex { x: 110, y: 20 },
                Vertex { x: 110, y: 70 },
                Vertex { x: 10, y: 70 },
            ],
        };
        assert_eq!(poly.area(), 100 * 50);
    }

    #[test]
    fn empty_poly_has_zero_area() {
        assert_eq!(BoundingPoly::default().area(), 0);
    }
}

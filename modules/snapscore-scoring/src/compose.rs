//! Score composition: one deterministic number from three analyses.
//!
//! `total = round2((expression × theme / 100) × penalty)`. Expression and
//! theme sit on comparable dynamic ranges, so the product couples "how
//! joyful" with "how on-theme"; a detected near-duplicate keeps a third of
//! its score rather than zero, since a repost can still be a new moment.

use chrono::Utc;
use serde::Serialize;

use snapscore_common::ScoreUpdate;

use crate::expression::ExpressionResult;
use crate::theme::ThemeResult;

/// Multiplier applied when the submission is a near-duplicate.
pub const DUPLICATE_PENALTY: f64 = 0.33;

const EXPRESSION_WARNING: &str =
    "⚠️ Smile detection hit an error; no smile points could be awarded.";
const THEME_WARNING: &str = "⚠️ The AI evaluation hit an error; a default score was applied.";

/// Final composed result for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedScore {
    pub expression_score: f64,
    pub theme_score: u32,
    pub total_score: f64,
    pub is_duplicate: bool,
    pub face_count: u32,
    pub smiling_faces: u32,
    pub perceptual_hash: String,
    pub comment: String,
    /// Adapter error tags, empty on a clean run.
    pub errors: Vec<&'static str>,
}

impl ComposedScore {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The submission-store update for this result.
    pub fn to_update(&self) -> ScoreUpdate {
        ScoreUpdate {
            expression_score: self.expression_score,
            theme_score: self.theme_score,
            total_score: self.total_score,
            is_duplicate: self.is_duplicate,
            perceptual_hash: self.perceptual_hash.clone(),
            comment: self.comment.clone(),
            face_count: self.face_count,
            scored_at: Utc::now(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Smile-count line for the user-facing comment. Ten or more faces read as
/// a crowd instead of exact numbers.
fn smile_line(smiling_faces: u32, face_count: u32) -> String {
    if face_count >= 10 {
        "Smile check: the whole crowd is beaming!".to_string()
    } else {
        format!("Smile check: {smiling_faces} of {face_count} faces are smiling!")
    }
}

/// Combine adapter outputs and the similarity verdict into a final score
/// and user-facing comment, error warnings first.
pub fn compose(
    expression: &ExpressionResult,
    theme: &ThemeResult,
    is_duplicate: bool,
    perceptual_hash: String,
) -> ComposedScore {
    let penalty = if is_duplicate { DUPLICATE_PENALTY } else { 1.0 };
    let expression_score = expression.score();
    let theme_score = theme.score();
    let total_score = round2((expression_score * f64::from(theme_score) / 100.0) * penalty);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    if expression.error_tag().is_some() {
        errors.push(crate::expression::EXPRESSION_ERROR_TAG);
        warnings.push(EXPRESSION_WARNING);
    }
    if let Some(tag) = theme.error_tag() {
        errors.push(tag);
        warnings.push(THEME_WARNING);
    }

    let smile = smile_line(expression.smiling_faces(), expression.face_count());
    let comment = if warnings.is_empty() {
        format!("{}\n\n{}", theme.comment(), smile)
    } else {
        format!("{}\n\n{}\n\n{}", warnings.join("\n"), theme.comment(), smile)
    };

    ComposedScore {
        expression_score,
        theme_score,
        total_score,
        is_duplicate,
        face_count: expression.face_count(),
        smiling_faces: expression.smiling_faces(),
        perceptual_hash,
        comment,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeFailure;

    fn scored_expression(score: f64) -> ExpressionResult {
        ExpressionResult::Scored {
            score,
            face_count: 4,
            smiling_faces: 3,
        }
    }

    fn scored_theme(score: u32) -> ThemeResult {
        ThemeResult::Scored {
            score,
            comment: "Great energy".to_string(),
        }
    }

    #[test]
    fn full_weight_composition() {
        let composed = compose(&scored_expression(450.0), &scored_theme(80), false, "ab".into());
        assert_eq!(composed.total_score, 360.0);
        assert!(!composed.has_errors());
    }

    #[test]
    fn duplicate_penalty_keeps_a_third() {
        let composed = compose(&scored_expression(450.0), &scored_theme(80), true, "ab".into());
        assert_eq!(composed.total_score, 118.8);
        assert!(composed.is_duplicate);
    }

    #[test]
    fn failed_expression_zeroes_the_total() {
        let composed = compose(&ExpressionResult::Failed, &scored_theme(90), false, "ab".into());
        assert_eq!(composed.total_score, 0.0);
        assert_eq!(composed.errors, vec!["vision_api_failed"]);
        assert!(composed.comment.contains("Smile detection hit an error"));
    }

    #[test]
    fn theme_fallback_is_flagged_in_comment_and_errors() {
        let theme = ThemeResult::Fallback {
            kind: ThemeFailure::ApiFailed,
        };
        let composed = compose(&scored_expression(200.0), &theme, false, "ab".into());
        assert_eq!(composed.total_score, 100.0);
        assert_eq!(composed.errors, vec!["genai_api_failed"]);
        assert!(composed.comment.contains("⚠️"));
    }

    #[test]
    fn comment_orders_warnings_theme_then_smiles() {
        let composed = compose(&ExpressionResult::Failed, &scored_theme(80), false, "ab".into());
        let warning_pos = composed.comment.find('⚠').unwrap();
        let theme_pos = composed.comment.find("Great energy").unwrap_or(usize::MAX);
        let smile_pos = composed.comment.find("Smile check").unwrap();
        assert!(warning_pos < smile_pos);
        assert!(theme_pos < smile_pos);
    }

    #[test]
    fn clean_run_has_no_warning_prefix() {
        let composed = compose(&scored_expression(300.0), &scored_theme(80), false, "ab".into());
        assert!(!composed.comment.contains('⚠'));
        assert!(composed.comment.starts_with("Great energy"));
        assert!(composed.comment.contains("3 of 4 faces"));
    }

    #[test]
    fn crowds_hide_exact_counts() {
        let expression = ExpressionResult::Scored {
            score: 500.0,
            face_count: 12,
            smiling_faces: 11,
        };
        let composed = compose(&expression, &scored_theme(80), false, "ab".into());
        assert!(composed.comment.contains("whole crowd"));
        assert!(!composed.comment.contains("11 of 12"));
    }

    #[test]
    fn rounding_is_two_decimals() {
        // 123.45 * 81 / 100 = 99.9945 → 99.99
        let composed = compose(&scored_expression(123.45), &scored_theme(81), false, "ab".into());
        assert_eq!(composed.total_score, 99.99);
    }
}

//! Best-effort chat notification.
//!
//! Every terminal pipeline outcome sends exactly one message attempt.
//! Transient push failures are retried on the shared policy; anything else
//! is logged and swallowed — delivery is never allowed to fail the scoring
//! result.

use chatbot_client::ChatError;
use tracing::{info, warn};

use crate::compose::ComposedScore;
use crate::retry::RetryPolicy;
use crate::traits::ChatNotifier;

pub const FAILURE_MESSAGE: &str =
    "Sorry — something went wrong while scoring your photo. Please try sending it again!";

/// Render the success notification for a composed result.
pub fn result_message(composed: &ComposedScore) -> String {
    let mut text = format!(
        "Your photo scored {:.2} points!\n\nSmile score: {:.2}\nTheme score: {}\n\n{}",
        composed.total_score, composed.expression_score, composed.theme_score, composed.comment
    );
    if composed.is_duplicate {
        text.push_str("\n\nThis photo looks very similar to one you already sent, so a reduced score was applied.");
    }
    text
}

/// Push `text` to `recipient`, retrying transient errors. Never errors.
pub async fn send_best_effort(
    notifier: &dyn ChatNotifier,
    retry: &RetryPolicy,
    recipient: &str,
    text: &str,
) {
    let outcome = retry
        .run("chat_push", ChatError::is_transient, || {
            notifier.push(recipient, text)
        })
        .await;

    match outcome {
        Ok(()) => info!(recipient, "notification delivered"),
        Err(err) => warn!(recipient, error = %err, "notification dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionResult;
    use crate::theme::ThemeResult;

    fn composed(is_duplicate: bool) -> ComposedScore {
        let expression = ExpressionResult::Scored {
            score: 190.0,
            face_count: 2,
            smiling_faces: 2,
        };
        let theme = ThemeResult::Scored {
            score: 80,
            comment: "Nice".to_string(),
        };
        crate::compose::compose(&expression, &theme, is_duplicate, "h".to_string())
    }

    #[test]
    fn result_message_carries_scores_and_comment() {
        let text = result_message(&composed(false));
        assert!(text.contains("152.00 points"));
        assert!(text.contains("Smile score: 190.00"));
        assert!(text.contains("Theme score: 80"));
        assert!(text.contains("Nice"));
        assert!(!text.contains("similar"));
    }

    #[test]
    fn duplicate_note_is_appended() {
        let text = result_message(&composed(true));
        assert!(text.contains("reduced score"));
    }
}

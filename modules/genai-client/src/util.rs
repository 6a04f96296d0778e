/// Strip markdown code fences from a model response.
///
/// Generative models routinely wrap JSON output in ```json fences even when
/// told not to; callers parse the stripped text.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_blocks("```json\n{\"score\": 80}\n```"), "{\"score\": 80}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_blocks("{\"score\": 80}"), "{\"score\": 80}");
    }
}

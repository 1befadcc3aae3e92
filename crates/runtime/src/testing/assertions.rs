use serde_json::Value;

use aa_domain::{ActionResult, OutputFormat};

/// Fluent assertions over an [`ActionResult`].
///
/// ```ignore
/// ResultAssertions::new(&result)
///     .assert_is_text()
///     .assert_text_contains("hello")
///     .assert_provider("fake");
/// ```
pub struct ResultAssertions<'a> {
    result: &'a ActionResult,
}

impl<'a> ResultAssertions<'a> {
    pub fn new(result: &'a ActionResult) -> Self {
        Self { result }
    }

    #[track_caller]
    pub fn assert_text(&self, expected: &str) -> &Self {
        assert_eq!(self.result.text(), expected, "unexpected result text");
        self
    }

    #[track_caller]
    pub fn assert_text_contains(&self, needle: &str) -> &Self {
        assert!(
            self.result.text().contains(needle),
            "expected result text to contain {needle:?}, got {:?}",
            self.result.text()
        );
        self
    }

    #[track_caller]
    pub fn assert_is_structured(&self) -> &Self {
        assert!(
            self.result.is_structured(),
            "expected a structured result, got {:?}",
            self.result.format()
        );
        self
    }

    #[track_caller]
    pub fn assert_is_text(&self) -> &Self {
        assert_eq!(self.result.format(), OutputFormat::Text, "expected a text result");
        self
    }

    #[track_caller]
    pub fn assert_structured(&self, expected: &Value) -> &Self {
        assert_eq!(
            self.result.structured_value(),
            Some(expected),
            "unexpected structured value"
        );
        self
    }

    #[track_caller]
    pub fn assert_provider(&self, expected: &str) -> &Self {
        assert_eq!(self.result.provider(), expected, "unexpected provider");
        self
    }

    #[track_caller]
    pub fn assert_model(&self, expected: &str) -> &Self {
        assert_eq!(self.result.model(), expected, "unexpected model");
        self
    }

    #[track_caller]
    pub fn assert_input_tokens(&self, expected: u32) -> &Self {
        assert_eq!(self.result.input_tokens(), expected, "unexpected input tokens");
        self
    }

    #[track_caller]
    pub fn assert_output_tokens(&self, expected: u32) -> &Self {
        assert_eq!(self.result.output_tokens(), expected, "unexpected output tokens");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chains_on_matching_result() {
        let result = ActionResult::structured("{}", json!({"n": 1}), "anthropic", "claude-x")
            .with_tokens(4, 9);
        ResultAssertions::new(&result)
            .assert_is_structured()
            .assert_structured(&json!({"n": 1}))
            .assert_provider("anthropic")
            .assert_model("claude-x")
            .assert_input_tokens(4)
            .assert_output_tokens(9);
    }

    #[test]
    #[should_panic(expected = "expected result text to contain")]
    fn text_contains_failure() {
        let result = ActionResult::plain("hello", "p", "m");
        ResultAssertions::new(&result).assert_text_contains("bye");
    }

    #[test]
    #[should_panic(expected = "expected a structured result")]
    fn markdown_is_not_structured() {
        let result = ActionResult::markdown("# Title", "p", "m");
        ResultAssertions::new(&result).assert_is_structured();
    }
}

//! Recording stand-in for the dispatcher.
//!
//! [`FakeDispatcher`] implements [`ActionRunner`] without touching a
//! provider: every call is logged under the action's id, and the answer is
//! whatever was registered for that id (or an empty text result).

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use aa_domain::{ActionContext, ActionId, ActionResult, AgentExecutionError};

use crate::action::AgentAction;
use crate::dispatcher::ActionRunner;

/// Provider and model reported by every fake result.
pub const FAKE_PROVIDER: &str = "fake";
pub const FAKE_MODEL: &str = "fake";

#[derive(Debug, Clone)]
struct CannedResponse {
    text: String,
    structured: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    responses: HashMap<ActionId, CannedResponse>,
    calls: HashMap<ActionId, Vec<ActionContext>>,
}

#[derive(Default)]
pub struct FakeDispatcher {
    state: Mutex<FakeState>,
}

impl FakeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the answer for `action`.  Replaces any earlier registration.
    ///
    /// A `Some(Value::Null)` structured value counts as absent.
    pub fn register_response(
        &self,
        action: impl Into<ActionId>,
        text: impl Into<String>,
        structured: Option<Value>,
    ) {
        let structured = structured.filter(|v| !v.is_null());
        self.state.lock().responses.insert(
            action.into(),
            CannedResponse {
                text: text.into(),
                structured,
            },
        );
    }

    /// Log the call and build the canned result.  Never fails.
    pub fn respond(&self, action: &ActionId, context: &ActionContext) -> ActionResult {
        let mut state = self.state.lock();
        state
            .calls
            .entry(action.clone())
            .or_default()
            .push(context.clone());

        match state.responses.get(action).cloned() {
            Some(CannedResponse {
                text,
                structured: Some(value),
            }) => ActionResult::structured(text, value, FAKE_PROVIDER, FAKE_MODEL),
            Some(CannedResponse { text, .. }) => {
                ActionResult::plain(text, FAKE_PROVIDER, FAKE_MODEL)
            }
            None => ActionResult::plain("", FAKE_PROVIDER, FAKE_MODEL),
        }
    }

    // ── Call log ───────────────────────────────────────────────────

    /// Contexts logged for `action`, in call order.
    pub fn calls(&self, action: &ActionId) -> Vec<ActionContext> {
        self.state
            .lock()
            .calls
            .get(action)
            .cloned()
            .unwrap_or_default()
    }

    pub fn call_count(&self, action: &ActionId) -> usize {
        self.state.lock().calls.get(action).map_or(0, Vec::len)
    }

    pub fn last_context(&self, action: &ActionId) -> Option<ActionContext> {
        self.state
            .lock()
            .calls
            .get(action)
            .and_then(|calls| calls.last().cloned())
    }

    /// Forget every registered response and every logged call.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.responses.clear();
        state.calls.clear();
    }

    // ── Assertions ─────────────────────────────────────────────────

    #[track_caller]
    pub fn assert_called(&self, action: &ActionId, times: usize) {
        let actual = self.call_count(action);
        assert_eq!(
            actual, times,
            "expected [{action}] to be called {times} time(s), but it was called {actual} time(s)"
        );
    }

    #[track_caller]
    pub fn assert_not_called(&self, action: &ActionId) {
        let actual = self.call_count(action);
        assert_eq!(
            actual, 0,
            "expected [{action}] not to be called, but it was called {actual} time(s)"
        );
    }

    #[track_caller]
    pub fn assert_last_context_had_record(&self, action: &ActionId) {
        let Some(ctx) = self.last_context(action) else {
            panic!("[{action}] was never called");
        };
        assert!(
            ctx.record().is_some(),
            "expected the last context for [{action}] to contain a record"
        );
    }

    /// The last context for `action` carried `key`, equal to `expected`.
    #[track_caller]
    pub fn assert_last_context_had_meta(
        &self,
        action: &ActionId,
        key: &str,
        expected: impl Into<Value>,
    ) {
        let Some(ctx) = self.last_context(action) else {
            panic!("[{action}] was never called");
        };
        let Some(actual) = ctx.meta(key) else {
            panic!("expected the last context for [{action}] to contain metadata key \"{key}\"");
        };
        assert_eq!(
            actual,
            &expected.into(),
            "expected meta[\"{key}\"] of the last [{action}] call to equal the given value"
        );
    }
}

#[async_trait::async_trait]
impl ActionRunner for FakeDispatcher {
    async fn execute(
        &self,
        action: &dyn AgentAction,
        context: &ActionContext,
    ) -> Result<ActionResult, AgentExecutionError> {
        let id = action.action_id();
        tracing::debug!(action = %id, "fake dispatch");
        Ok(self.respond(&id, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aa_domain::OutputFormat;
    use serde_json::json;

    fn id() -> ActionId {
        ActionId::new("app::Classify")
    }

    #[test]
    fn unregistered_call_is_logged_and_empty() {
        let fake = FakeDispatcher::new();
        let result = fake.respond(&id(), &ActionContext::empty());

        assert_eq!(result.text(), "");
        assert_eq!(result.format(), OutputFormat::Text);
        assert!(result.structured_value().is_none());
        assert_eq!(result.input_tokens(), 0);
        assert_eq!(result.output_tokens(), 0);
        assert_eq!(result.provider(), FAKE_PROVIDER);
        fake.assert_called(&id(), 1);
    }

    #[test]
    fn last_registration_wins() {
        let fake = FakeDispatcher::new();
        fake.register_response(id(), "first", Some(json!({"label": "spam"})));
        fake.register_response(id(), "second", None);

        let result = fake.respond(&id(), &ActionContext::empty());
        assert_eq!(result.text(), "second");
        assert!(!result.is_structured());
    }

    #[test]
    fn structured_registration_sets_format() {
        let fake = FakeDispatcher::new();
        fake.register_response(id(), "{}", Some(json!({"label": "ham"})));
        let result = fake.respond(&id(), &ActionContext::empty());
        assert_eq!(result.format(), OutputFormat::Structured);
        assert_eq!(result.structured_value(), Some(&json!({"label": "ham"})));
        assert_eq!(result.total_tokens(), 0);
    }

    #[test]
    fn null_structured_counts_as_text() {
        let fake = FakeDispatcher::new();
        fake.register_response(id(), "plain", Some(Value::Null));
        let result = fake.respond(&id(), &ActionContext::empty());
        assert_eq!(result.format(), OutputFormat::Text);
    }

    #[test]
    fn reset_clears_log_and_registry() {
        let fake = FakeDispatcher::new();
        fake.register_response(id(), "canned", None);
        fake.respond(&id(), &ActionContext::empty());
        fake.reset();

        fake.assert_not_called(&id());
        assert_eq!(fake.respond(&id(), &ActionContext::empty()).text(), "");
    }

    #[test]
    fn calls_keep_order() {
        let fake = FakeDispatcher::new();
        fake.respond(&id(), &ActionContext::empty().with_meta("n", 1));
        fake.respond(&id(), &ActionContext::empty().with_meta("n", 2));

        let ns: Vec<_> = fake
            .calls(&id())
            .iter()
            .map(|c| c.meta("n").cloned())
            .collect();
        assert_eq!(ns, [Some(json!(1)), Some(json!(2))]);
        assert_eq!(fake.last_context(&id()).unwrap().meta("n"), Some(&json!(2)));
    }

    #[test]
    #[should_panic(expected = "called 2 time(s), but it was called 1 time(s)")]
    fn assert_called_reports_mismatch() {
        let fake = FakeDispatcher::new();
        fake.respond(&id(), &ActionContext::empty());
        fake.assert_called(&id(), 2);
    }

    #[test]
    fn assert_meta_accepts_matching_value() {
        let fake = FakeDispatcher::new();
        fake.respond(&id(), &ActionContext::empty().with_meta("day", "monday"));
        fake.assert_last_context_had_meta(&id(), "day", "monday");
    }

    #[test]
    #[should_panic(expected = "to equal the given value")]
    fn assert_meta_reports_value_mismatch() {
        let fake = FakeDispatcher::new();
        fake.respond(&id(), &ActionContext::empty().with_meta("day", "monday"));
        fake.assert_last_context_had_meta(&id(), "day", "tuesday");
    }

    #[test]
    #[should_panic(expected = "to contain metadata key \"day\"")]
    fn assert_meta_reports_missing_key() {
        let fake = FakeDispatcher::new();
        fake.respond(&id(), &ActionContext::empty());
        fake.assert_last_context_had_meta(&id(), "day", "monday");
    }

    #[test]
    #[should_panic(expected = "to contain a record")]
    fn assert_record_fails_without_record() {
        let fake = FakeDispatcher::new();
        fake.respond(&id(), &ActionContext::empty());
        fake.assert_last_context_had_record(&id());
    }
}

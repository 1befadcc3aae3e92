use serde::Serialize;

/// Structured trace events emitted across all agent-action crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    /// A successful execution, emitted only when `action.logging` is on.
    #[serde(rename = "ai-action.executed")]
    ActionExecuted {
        agent: String,
        provider: String,
        model: String,
        input_tokens: u32,
        output_tokens: u32,
    },
    #[serde(rename = "ai-action.queued")]
    JobQueued {
        agent: String,
        queue: String,
        unique_id: String,
    },
    /// A submission dropped because an identical job is still pending.
    #[serde(rename = "ai-action.deduplicated")]
    JobDeduplicated {
        agent: String,
        queue: String,
        unique_id: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "aa_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn executed_event_shape() {
        let ev = TraceEvent::ActionExecuted {
            agent: "app::Summarize".into(),
            provider: "anthropic".into(),
            model: "claude-x".into(),
            input_tokens: 5,
            output_tokens: 3,
        };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({
                "event": "ai-action.executed",
                "agent": "app::Summarize",
                "provider": "anthropic",
                "model": "claude-x",
                "input_tokens": 5,
                "output_tokens": 3,
            })
        );
    }
}

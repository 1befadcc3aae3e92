//! The action contract and its optional capabilities.
//!
//! An action builds the instructions and prompt for one provider call from
//! an [`ActionContext`].  It may additionally declare structured output,
//! streaming or tool use by returning `Some(self)` from the matching
//! accessor; the dispatcher reads those accessors once per execution.

use aa_domain::error::Result;
use aa_domain::tool::ToolDefinition;
use aa_domain::{ActionContext, ActionId, ActionResult, SchemaNode};
use serde_json::{Map, Value};

pub trait AgentAction: Send + Sync {
    /// Stable identity used for call logs, canned responses, job
    /// fingerprints and error reports.
    fn action_id(&self) -> ActionId {
        ActionId::of::<Self>()
    }

    /// System-level directive.
    fn instructions(&self, ctx: &ActionContext) -> Result<String>;

    /// User-facing request text.
    fn prompt(&self, ctx: &ActionContext) -> Result<String>;

    /// Provider key; `None` uses the configured default.
    fn provider(&self) -> Option<&str> {
        None
    }

    /// Model identifier; `None` uses the configured default.
    fn model(&self) -> Option<&str> {
        None
    }

    fn structured_output(&self) -> Option<&dyn StructuredOutput> {
        None
    }

    fn streaming(&self) -> Option<&dyn StreamingResponse> {
        None
    }

    fn tools(&self) -> Option<&dyn HasTools> {
        None
    }
}

/// The action expects a JSON object matching [`output_schema`](Self::output_schema).
pub trait StructuredOutput: Send + Sync {
    fn output_schema(&self) -> SchemaNode;

    /// Turn the provider's raw object into the final structured value.
    /// Whatever is returned lands in the result untouched.
    fn map_output(&self, raw: Map<String, Value>) -> Result<Value> {
        Ok(Value::Object(raw))
    }
}

/// The action consumes the response as a stream of text chunks.
pub trait StreamingResponse: Send + Sync {
    /// Called for each text delta in arrival order.  Return `false` to stop
    /// reading the stream.
    fn on_chunk(&self, chunk: &str) -> bool;

    /// Called exactly once with the final result, after the last chunk.
    fn on_complete(&self, _result: &ActionResult) {}
}

/// The action hands tool definitions to the model.
pub trait HasTools: Send + Sync {
    fn tool_definitions(&self) -> Vec<ToolDefinition>;
}

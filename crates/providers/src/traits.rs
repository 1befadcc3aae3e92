use aa_domain::error::{Error, Result};
use aa_domain::stream::{BoxStream, StreamEvent, Usage};
use aa_domain::tool::{Message, ToolDefinition};
use serde_json::{Map, Value};

use crate::schema::TypedSchema;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic prompt request, used for text and streaming calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptRequest {
    /// System-level directive.
    pub instructions: String,
    /// Prior conversation turns.  The dispatcher always sends none.
    pub messages: Vec<Message>,
    /// The user prompt.
    pub prompt: String,
    /// Provider key the request is addressed to.
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Tool definitions the model may invoke.
    pub tools: Vec<ToolDefinition>,
    /// Maximum tokens in the response. `None` lets the provider choose.
    pub max_tokens: Option<u32>,
}

/// A prompt request that asks for output matching `schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub base: PromptRequest,
    pub schema: TypedSchema,
}

/// The response of a plain text call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextResponse {
    pub text: String,
    pub usage: Usage,
    /// Provider-specific metadata (message id, finish reason, ...).
    pub meta: Map<String, Value>,
}

/// The response of a structured call.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResponse {
    pub text: String,
    pub usage: Usage,
    pub meta: Map<String, Value>,
    /// The decoded structured output.
    pub payload: Value,
}

impl StructuredResponse {
    /// The payload as a raw key/value map.
    ///
    /// Anything but a JSON object is an `UnexpectedResponseShape`.
    pub fn to_raw_map(&self) -> Result<Map<String, Value>> {
        match &self.payload {
            Value::Object(map) => Ok(map.clone()),
            other => Err(Error::UnexpectedResponseShape {
                expected: "structured object".into(),
                actual: json_kind(other).into(),
            }),
        }
    }
}

/// Whatever a structured call came back with.
///
/// Providers may answer a structured request with plain text; callers decide
/// whether that is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    Text(TextResponse),
    Structured(StructuredResponse),
}

impl ProviderResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderResponse::Text(_) => "text",
            ProviderResponse::Structured(_) => "structured",
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The capability surface the dispatcher needs from a generative-AI client.
///
/// Implementations wrap a concrete SDK or HTTP adapter; token accounting,
/// retries and rate limiting are theirs to handle.
#[async_trait::async_trait]
pub trait ProviderClient: Send + Sync {
    /// Send a prompt and wait for the full text response.
    async fn prompt(&self, req: PromptRequest) -> Result<TextResponse>;

    /// Send a prompt that must be answered with output matching `req.schema`.
    async fn prompt_structured(&self, req: StructuredRequest) -> Result<ProviderResponse>;

    /// Send a prompt and return a stream of events.
    async fn stream(&self, req: PromptRequest) -> Result<BoxStream<'static, Result<StreamEvent>>>;

    /// A unique identifier for this client instance.
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(payload: Value) -> StructuredResponse {
        StructuredResponse {
            text: String::new(),
            usage: Usage::default(),
            meta: Map::new(),
            payload,
        }
    }

    #[test]
    fn object_payload_decomposes() {
        let map = structured(json!({"a": 1})).to_raw_map().unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    fn array_payload_is_unexpected_shape() {
        let err = structured(json!([1, 2])).to_raw_map().unwrap_err();
        match err {
            Error::UnexpectedResponseShape { actual, .. } => assert_eq!(actual, "array"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

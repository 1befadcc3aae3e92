use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// The shape of an [`ActionResult`]'s output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Structured,
    Markdown,
}

/// The normalized output of one successful execution.
///
/// The format is derived from the payload rather than stored beside it: a
/// result carries a structured value if and only if its format is
/// [`OutputFormat::Structured`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    text: String,
    body: Body,
    input_tokens: u32,
    output_tokens: u32,
    provider: String,
    model: String,
    metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Text,
    Markdown,
    Structured(Value),
}

impl ActionResult {
    /// A plain-text result.
    pub fn plain(
        text: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_body(text.into(), Body::Text, provider.into(), model.into())
    }

    /// A Markdown result.  Never structured.
    pub fn markdown(
        text: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_body(text.into(), Body::Markdown, provider.into(), model.into())
    }

    /// A structured result holding the mapped output value.
    pub fn structured(
        text: impl Into<String>,
        value: Value,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_body(text.into(), Body::Structured(value), provider.into(), model.into())
    }

    fn with_body(text: String, body: Body, provider: String, model: String) -> Self {
        Self {
            text,
            body,
            input_tokens: 0,
            output_tokens: 0,
            provider,
            model,
            metadata: Map::new(),
        }
    }

    pub fn with_tokens(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> OutputFormat {
        match self.body {
            Body::Text => OutputFormat::Text,
            Body::Markdown => OutputFormat::Markdown,
            Body::Structured(_) => OutputFormat::Structured,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.format() == OutputFormat::Structured
    }

    pub fn structured_value(&self) -> Option<&Value> {
        match &self.body {
            Body::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// Deserialize the structured value into a caller type.
    /// `Ok(None)` for non-structured results.
    pub fn structured_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.structured_value()
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Into::into)
    }

    pub fn input_tokens(&self) -> u32 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u32 {
        self.output_tokens
    }

    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

impl Serialize for ActionResult {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("ActionResult", 8)?;
        s.serialize_field("text", &self.text)?;
        s.serialize_field("format", &self.format())?;
        s.serialize_field("structured", &self.structured_value())?;
        s.serialize_field("input_tokens", &self.input_tokens)?;
        s.serialize_field("output_tokens", &self.output_tokens)?;
        s.serialize_field("provider", &self.provider)?;
        s.serialize_field("model", &self.model)?;
        s.serialize_field("metadata", &self.metadata)?;
        s.end()
    }
}

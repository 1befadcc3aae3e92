//! Capability classification.
//!
//! [`Capabilities::of`] reads an action's optional capability accessors
//! exactly once; everything downstream (strategy, branch, tool list) is a
//! pure function of that snapshot.

use crate::action::{AgentAction, HasTools, StreamingResponse, StructuredOutput};
use aa_domain::tool::ToolDefinition;
use serde::Serialize;
use std::fmt;

/// The execution strategy chosen for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Structured,
    Streaming,
    Text,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Structured => "structured",
            Strategy::Streaming => "streaming",
            Strategy::Text => "text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The branch to run, holding the capability it needs.
pub enum Branch<'a> {
    Structured(&'a dyn StructuredOutput),
    Streaming(&'a dyn StreamingResponse),
    Text,
}

impl Branch<'_> {
    pub fn strategy(&self) -> Strategy {
        match self {
            Branch::Structured(_) => Strategy::Structured,
            Branch::Streaming(_) => Strategy::Streaming,
            Branch::Text => Strategy::Text,
        }
    }
}

/// Snapshot of the capabilities an action declares.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    structured: Option<&'a dyn StructuredOutput>,
    streaming: Option<&'a dyn StreamingResponse>,
    tools: Option<&'a dyn HasTools>,
}

impl<'a> Capabilities<'a> {
    pub fn of(action: &'a dyn AgentAction) -> Self {
        Self {
            structured: action.structured_output(),
            streaming: action.streaming(),
            tools: action.tools(),
        }
    }

    pub fn has_structured_output(&self) -> bool {
        self.structured.is_some()
    }

    pub fn has_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    pub fn has_tools(&self) -> bool {
        self.tools.is_some()
    }

    /// Structured wins over streaming, streaming over plain text.
    pub fn branch(&self) -> Branch<'a> {
        match (self.structured, self.streaming) {
            (Some(s), _) => Branch::Structured(s),
            (None, Some(s)) => Branch::Streaming(s),
            (None, None) => Branch::Text,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.branch().strategy()
    }

    /// Tool definitions to attach, empty when the action declares none.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.map(|t| t.tool_definitions()).unwrap_or_default()
    }
}

impl fmt::Debug for Capabilities<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("structured", &self.has_structured_output())
            .field("streaming", &self.has_streaming())
            .field("tools", &self.has_tools())
            .finish()
    }
}

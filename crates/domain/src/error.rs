use crate::context::ActionContext;
use crate::id::ActionId;

/// Shared error type used across all agent-action crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("expected {expected} response, got {actual}")]
    UnexpectedResponseShape { expected: String, actual: String },

    #[error(transparent)]
    InvalidContext(#[from] InvalidContextError),

    #[error(transparent)]
    Execution(Box<AgentExecutionError>),

    #[error("config: {0}")]
    Config(String),

    #[error("queue: {0}")]
    Queue(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<AgentExecutionError> for Error {
    fn from(e: AgentExecutionError) -> Self {
        Error::Execution(Box::new(e))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AgentExecutionError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The single error kind surfaced by an action execution.
///
/// Records which action failed and chains the underlying cause.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct AgentExecutionError {
    action: ActionId,
    message: String,
    #[source]
    source: Error,
}

impl AgentExecutionError {
    pub fn new(action: ActionId, message: impl Into<String>, source: Error) -> Self {
        Self {
            action,
            message: message.into(),
            source,
        }
    }

    /// Wrap `cause` for `action`.  An error that already is an execution
    /// error is returned as-is so the chain never nests twice.
    pub fn wrap(action: &ActionId, cause: Error) -> Self {
        match cause {
            Error::Execution(inner) => *inner,
            other => Self {
                message: format!("Agent [{action}] failed: {other}"),
                action: action.clone(),
                source: other,
            },
        }
    }

    /// Identity of the action that raised this error.
    pub fn action(&self) -> &ActionId {
        &self.action
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying cause.
    pub fn cause(&self) -> &Error {
        &self.source
    }

    pub fn into_cause(self) -> Error {
        self.source
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// InvalidContextError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidContextKind {
    MissingRecord,
    MissingMeta(String),
}

/// Raised when a context lacks data an action declares mandatory.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct InvalidContextError {
    kind: InvalidContextKind,
    message: String,
    context: ActionContext,
}

impl InvalidContextError {
    pub fn missing_record(context: &ActionContext) -> Self {
        Self {
            kind: InvalidContextKind::MissingRecord,
            message: "The context must contain a record, but none was provided.".into(),
            context: context.clone(),
        }
    }

    pub fn missing_meta(context: &ActionContext, key: &str) -> Self {
        Self {
            kind: InvalidContextKind::MissingMeta(key.to_string()),
            message: format!("The context is missing required metadata key \"{key}\"."),
            context: context.clone(),
        }
    }

    pub fn kind(&self) -> &InvalidContextKind {
        &self.kind
    }

    /// The context that failed validation.
    pub fn context(&self) -> &ActionContext {
        &self.context
    }
}

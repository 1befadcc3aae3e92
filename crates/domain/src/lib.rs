pub mod config;
pub mod context;
pub mod error;
pub mod id;
pub mod result;
pub mod schema;
pub mod stream;
pub mod tool;
pub mod trace;

pub use context::{ActionContext, Record};
pub use error::{AgentExecutionError, Error, InvalidContextError, Result};
pub use id::ActionId;
pub use result::{ActionResult, OutputFormat};
pub use schema::SchemaNode;

pub mod registry;
pub mod schema;
pub mod scripted;
pub mod text_stream;
pub mod traits;

// Re-exports for convenience.
pub use registry::ProviderRegistry;
pub use schema::{translate, SchemaType, TypedSchema};
pub use scripted::{RecordedRequest, ScriptedProvider};
pub use text_stream::TextStream;
pub use traits::{
    PromptRequest, ProviderClient, ProviderResponse, StructuredRequest, StructuredResponse,
    TextResponse,
};

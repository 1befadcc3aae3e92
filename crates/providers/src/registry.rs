//! Provider registry.
//!
//! Holds every configured [`ProviderClient`] keyed by provider key and routes
//! each request to the client named in `req.provider`.  The registry is
//! itself a `ProviderClient`, so the dispatcher never needs to know how many
//! backends exist.

use crate::traits::{
    PromptRequest, ProviderClient, ProviderResponse, StructuredRequest, TextResponse,
};
use aa_domain::error::{Error, Result};
use aa_domain::stream::{BoxStream, StreamEvent};
use std::collections::HashMap;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProviderRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under `provider_key`, replacing any previous entry.
    pub fn register(&mut self, provider_key: impl Into<String>, client: Arc<dyn ProviderClient>) {
        let key = provider_key.into();
        tracing::info!(
            provider = %key,
            client = %client.provider_id(),
            "registered provider client"
        );
        self.providers.insert(key, client);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(
        mut self,
        provider_key: impl Into<String>,
        client: Arc<dyn ProviderClient>,
    ) -> Self {
        self.register(provider_key, client);
        self
    }

    /// Look up a client by provider key.
    pub fn get(&self, provider_key: &str) -> Option<Arc<dyn ProviderClient>> {
        self.providers.get(provider_key).cloned()
    }

    fn resolve(&self, provider_key: &str) -> Result<Arc<dyn ProviderClient>> {
        self.get(provider_key).ok_or_else(|| {
            Error::Config(format!("no provider registered for '{provider_key}'"))
        })
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// List all registered provider keys (sorted).
    pub fn list_providers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait::async_trait]
impl ProviderClient for ProviderRegistry {
    async fn prompt(&self, req: PromptRequest) -> Result<TextResponse> {
        self.resolve(&req.provider)?.prompt(req).await
    }

    async fn prompt_structured(&self, req: StructuredRequest) -> Result<ProviderResponse> {
        self.resolve(&req.base.provider)?.prompt_structured(req).await
    }

    async fn stream(&self, req: PromptRequest) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        self.resolve(&req.provider)?.stream(req).await
    }

    fn provider_id(&self) -> &str {
        "registry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedProvider;
    use aa_domain::stream::Usage;

    fn request(provider: &str) -> PromptRequest {
        PromptRequest {
            provider: provider.into(),
            model: "m".into(),
            prompt: "hi".into(),
            ..PromptRequest::default()
        }
    }

    #[tokio::test]
    async fn routes_by_provider_key() {
        let anthropic = Arc::new(ScriptedProvider::new("anthropic"));
        let openai = Arc::new(ScriptedProvider::new("openai"));
        anthropic.push_text("from anthropic", Usage::new(1, 1));
        openai.push_text("from openai", Usage::new(1, 1));

        let registry = ProviderRegistry::new()
            .with("anthropic", anthropic.clone())
            .with("openai", openai.clone());

        let resp = registry.prompt(request("openai")).await.unwrap();
        assert_eq!(resp.text, "from openai");
        assert_eq!(openai.requests().len(), 1);
        assert!(anthropic.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_provider_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = registry.prompt(request("mistral")).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("mistral"));
    }

    #[test]
    fn lists_sorted_keys() {
        let registry = ProviderRegistry::new()
            .with("openai", Arc::new(ScriptedProvider::new("openai")))
            .with("anthropic", Arc::new(ScriptedProvider::new("anthropic")));
        assert_eq!(registry.list_providers(), ["anthropic", "openai"]);
        assert_eq!(registry.len(), 2);
    }
}

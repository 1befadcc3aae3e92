//! The execution dispatcher.
//!
//! [`Dispatcher::execute`] classifies the action once, runs the structured,
//! streaming or text branch against the provider client, and normalizes the
//! outcome: an [`ActionResult`] on success, an [`AgentExecutionError`] for
//! any failure on any path.

use std::sync::Arc;

use aa_domain::config::ActionConfig;
use aa_domain::error::{Error, Result};
use aa_domain::stream::StreamEvent;
use aa_domain::trace::TraceEvent;
use aa_domain::{ActionContext, ActionId, ActionResult, AgentExecutionError};
use aa_providers::{
    translate, PromptRequest, ProviderClient, ProviderResponse, StructuredRequest, TextStream,
};

use crate::action::{AgentAction, StreamingResponse, StructuredOutput};
use crate::capability::{Branch, Capabilities};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ActionRunner
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Anything that can execute an action: the real [`Dispatcher`] or the
/// recording fake in [`crate::testing`].
#[async_trait::async_trait]
pub trait ActionRunner: Send + Sync {
    async fn execute(
        &self,
        action: &dyn AgentAction,
        context: &ActionContext,
    ) -> std::result::Result<ActionResult, AgentExecutionError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatcher
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Dispatcher {
    client: Arc<dyn ProviderClient>,
    config: ActionConfig,
}

/// Provider and model a call is addressed to, after defaults are applied.
struct Target {
    provider: String,
    model: String,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ProviderClient>, config: ActionConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    fn target(&self, action: &dyn AgentAction) -> Target {
        Target {
            provider: action
                .provider()
                .unwrap_or(&self.config.provider)
                .to_string(),
            model: action.model().unwrap_or(&self.config.model).to_string(),
        }
    }

    fn request(
        &self,
        action: &dyn AgentAction,
        context: &ActionContext,
        caps: &Capabilities<'_>,
        target: &Target,
    ) -> Result<PromptRequest> {
        Ok(PromptRequest {
            instructions: action.instructions(context)?,
            messages: Vec::new(),
            prompt: action.prompt(context)?,
            provider: target.provider.clone(),
            model: target.model.clone(),
            tools: caps.tool_definitions(),
            max_tokens: Some(self.config.max_tokens),
        })
    }

    /// Everything inside the error boundary.
    async fn run(&self, action: &dyn AgentAction, context: &ActionContext) -> Result<ActionResult> {
        let caps = Capabilities::of(action);
        let branch = caps.branch();
        let target = self.target(action);

        tracing::debug!(
            action = %action.action_id(),
            strategy = %branch.strategy(),
            provider = %target.provider,
            model = %target.model,
            tools = caps.has_tools(),
            "dispatching action"
        );

        let req = self.request(action, context, &caps, &target)?;
        match branch {
            Branch::Structured(output) => self.run_structured(output, req, target).await,
            Branch::Streaming(handler) => {
                self.run_streaming(&action.action_id(), handler, req, target)
                    .await
            }
            Branch::Text => self.run_text(req, target).await,
        }
    }

    async fn run_text(&self, req: PromptRequest, target: Target) -> Result<ActionResult> {
        let resp = self.client.prompt(req).await?;
        Ok(ActionResult::plain(resp.text, target.provider, target.model)
            .with_tokens(resp.usage.prompt_tokens, resp.usage.completion_tokens)
            .with_metadata(resp.meta))
    }

    async fn run_structured(
        &self,
        output: &dyn StructuredOutput,
        req: PromptRequest,
        target: Target,
    ) -> Result<ActionResult> {
        let schema = translate(&output.output_schema());
        let resp = self
            .client
            .prompt_structured(StructuredRequest { base: req, schema })
            .await?;

        let resp = match resp {
            ProviderResponse::Structured(s) => s,
            other => {
                return Err(Error::UnexpectedResponseShape {
                    expected: "structured".into(),
                    actual: other.kind().into(),
                })
            }
        };

        let raw = resp.to_raw_map()?;
        let mapped = output.map_output(raw)?;
        Ok(
            ActionResult::structured(resp.text, mapped, target.provider, target.model)
                .with_tokens(resp.usage.prompt_tokens, resp.usage.completion_tokens)
                .with_metadata(resp.meta),
        )
    }

    async fn run_streaming(
        &self,
        id: &ActionId,
        handler: &dyn StreamingResponse,
        req: PromptRequest,
        target: Target,
    ) -> Result<ActionResult> {
        let inner = self.client.stream(req).await?;
        let mut stream = TextStream::new(target.provider.clone(), inner);

        while let Some(event) = stream.next_event().await {
            if let StreamEvent::TextDelta { delta } = event? {
                if !handler.on_chunk(&delta) {
                    tracing::debug!(action = %id, "stream halted by chunk handler");
                    break;
                }
            }
        }

        // Usage may never have arrived; count it as zero.
        let usage = stream.usage().unwrap_or_default();
        let result = ActionResult::plain(stream.text(), target.provider, target.model)
            .with_tokens(usage.prompt_tokens, usage.completion_tokens);

        handler.on_complete(&result);
        Ok(result)
    }
}

#[async_trait::async_trait]
impl ActionRunner for Dispatcher {
    async fn execute(
        &self,
        action: &dyn AgentAction,
        context: &ActionContext,
    ) -> std::result::Result<ActionResult, AgentExecutionError> {
        let id = action.action_id();

        match self.run(action, context).await {
            Ok(result) => {
                if self.config.logging {
                    TraceEvent::ActionExecuted {
                        agent: id.to_string(),
                        provider: result.provider().to_string(),
                        model: result.model().to_string(),
                        input_tokens: result.input_tokens(),
                        output_tokens: result.output_tokens(),
                    }
                    .emit();
                }
                Ok(result)
            }
            Err(e) => {
                let err = AgentExecutionError::wrap(&id, e);
                tracing::warn!(action = %id, error = %err, "action execution failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aa_domain::stream::Usage;
    use aa_providers::{RecordedRequest, ScriptedProvider};

    struct Echo;

    impl AgentAction for Echo {
        fn instructions(&self, _: &ActionContext) -> Result<String> {
            Ok("Repeat the input.".into())
        }
        fn prompt(&self, ctx: &ActionContext) -> Result<String> {
            Ok(ctx.user_instruction().unwrap_or_default().to_string())
        }
    }

    #[tokio::test]
    async fn config_defaults_fill_target_and_max_tokens() {
        let provider = Arc::new(ScriptedProvider::new("scripted"));
        provider.push_text("echo", Usage::new(1, 1));
        let config = ActionConfig {
            max_tokens: 512,
            ..ActionConfig::default()
        };
        let dispatcher = Dispatcher::new(provider.clone(), config);

        let ctx = ActionContext::empty().with_user_instruction("ping");
        let result = dispatcher.execute(&Echo, &ctx).await.unwrap();
        assert_eq!(result.provider(), "anthropic");
        assert_eq!(result.model(), "claude-sonnet-4-20250514");

        let Some(RecordedRequest::Prompt(req)) = provider.last_request() else {
            panic!("expected a text request");
        };
        assert_eq!(req.prompt, "ping");
        assert_eq!(req.instructions, "Repeat the input.");
        assert_eq!(req.max_tokens, Some(512));
        assert!(req.tools.is_empty());
        assert!(req.messages.is_empty());
    }

    #[tokio::test]
    async fn prompt_construction_failure_skips_provider() {
        struct NeedsRecord;
        impl AgentAction for NeedsRecord {
            fn instructions(&self, ctx: &ActionContext) -> Result<String> {
                ctx.require_record()?;
                Ok(String::new())
            }
            fn prompt(&self, _: &ActionContext) -> Result<String> {
                Ok(String::new())
            }
        }

        let provider = Arc::new(ScriptedProvider::new("scripted"));
        let dispatcher = Dispatcher::new(provider.clone(), ActionConfig::default());
        let err = dispatcher
            .execute(&NeedsRecord, &ActionContext::empty())
            .await
            .unwrap_err();

        assert!(matches!(err.cause(), Error::InvalidContext(_)));
        assert!(provider.requests().is_empty());
    }
}

//! Offline smoke run: a built-in echo action goes through the real
//! dispatcher against a scripted provider, so the wiring can be checked
//! without network access or API keys.

use std::sync::Arc;

use aa_domain::config::ActionConfig;
use aa_domain::error::Result;
use aa_domain::stream::Usage;
use aa_domain::{ActionContext, ActionId, ActionResult};
use aa_providers::{ProviderRegistry, ScriptedProvider};
use aa_runtime::{ActionRunner, AgentAction, Capabilities, Dispatcher, StreamingResponse};

/// Echoes the user instruction; optionally consumes the answer as a stream.
struct Echo {
    stream: bool,
}

impl AgentAction for Echo {
    fn action_id(&self) -> ActionId {
        ActionId::new("agent-action::Echo")
    }

    fn instructions(&self, _ctx: &ActionContext) -> Result<String> {
        Ok("Repeat the user's text verbatim.".into())
    }

    fn prompt(&self, ctx: &ActionContext) -> Result<String> {
        Ok(ctx.user_instruction().unwrap_or_default().to_string())
    }

    fn streaming(&self) -> Option<&dyn StreamingResponse> {
        self.stream.then_some(self as &dyn StreamingResponse)
    }
}

impl StreamingResponse for Echo {
    fn on_chunk(&self, chunk: &str) -> bool {
        tracing::debug!(chunk, "echo chunk");
        true
    }

    fn on_complete(&self, result: &ActionResult) {
        tracing::debug!(chars = result.text().len(), "echo stream complete");
    }
}

/// Words of `text`, each but the last followed by its separating space.
fn chunks(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

/// Whitespace-separated word count, saturating at `u32::MAX`.
fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// Execute the echo action and return the result as pretty JSON.
pub async fn execute(config: ActionConfig, text: &str, stream: bool) -> anyhow::Result<String> {
    let scripted = Arc::new(ScriptedProvider::new("scripted"));
    let words = word_count(text);
    let usage = Usage::new(words, words);
    if stream {
        scripted.push_stream_deltas(chunks(text), Some(usage));
    } else {
        scripted.push_text(text, usage);
    }

    let registry = ProviderRegistry::new().with(config.provider.clone(), scripted);
    let dispatcher = Dispatcher::new(Arc::new(registry), config);

    let action = Echo { stream };
    tracing::info!(strategy = %Capabilities::of(&action).strategy(), "running echo action");

    let ctx = ActionContext::empty().with_user_instruction(text);
    let result = dispatcher.execute(&action, &ctx).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}

pub async fn run(config: ActionConfig, text: String, stream: bool) -> anyhow::Result<()> {
    println!("{}", execute(config, &text, stream).await?);
    Ok(())
}

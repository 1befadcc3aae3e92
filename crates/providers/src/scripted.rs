//! A scripted, in-memory [`ProviderClient`].
//!
//! Each call pops the next queued answer for its kind and records the
//! request it was given.  Used by tests across the workspace and by the
//! CLI's offline `run` command.

use crate::traits::{
    PromptRequest, ProviderClient, ProviderResponse, StructuredRequest, StructuredResponse,
    TextResponse,
};
use aa_domain::error::{Error, Result};
use aa_domain::stream::{BoxStream, StreamEvent, Usage};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A request as received by the [`ScriptedProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Prompt(PromptRequest),
    Structured(StructuredRequest),
    Stream(PromptRequest),
}

impl RecordedRequest {
    /// The shared prompt part of the request.
    pub fn prompt_request(&self) -> &PromptRequest {
        match self {
            RecordedRequest::Prompt(r) | RecordedRequest::Stream(r) => r,
            RecordedRequest::Structured(r) => &r.base,
        }
    }
}

#[derive(Default)]
struct Script {
    prompts: VecDeque<Result<TextResponse>>,
    structured: VecDeque<Result<ProviderResponse>>,
    streams: VecDeque<Result<Vec<Result<StreamEvent>>>>,
    requests: Vec<RecordedRequest>,
}

pub struct ScriptedProvider {
    id: String,
    script: Mutex<Script>,
    events_pulled: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(Script::default()),
            events_pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    // ── Text ───────────────────────────────────────────────────────

    pub fn push_text(&self, text: impl Into<String>, usage: Usage) {
        self.push_text_response(TextResponse {
            text: text.into(),
            usage,
            meta: Map::new(),
        });
    }

    pub fn push_text_response(&self, resp: TextResponse) {
        self.script.lock().prompts.push_back(Ok(resp));
    }

    pub fn push_prompt_error(&self, err: Error) {
        self.script.lock().prompts.push_back(Err(err));
    }

    // ── Structured ─────────────────────────────────────────────────

    pub fn push_structured(&self, payload: Value, usage: Usage) {
        let text = payload.to_string();
        self.push_structured_response(ProviderResponse::Structured(StructuredResponse {
            text,
            usage,
            meta: Map::new(),
            payload,
        }));
    }

    pub fn push_structured_response(&self, resp: ProviderResponse) {
        self.script.lock().structured.push_back(Ok(resp));
    }

    pub fn push_structured_error(&self, err: Error) {
        self.script.lock().structured.push_back(Err(err));
    }

    // ── Streaming ──────────────────────────────────────────────────

    /// Queue a stream yielding `events` in order.
    pub fn push_stream(&self, events: Vec<Result<StreamEvent>>) {
        self.script.lock().streams.push_back(Ok(events));
    }

    /// Queue a stream of text deltas followed by a `Done` event.
    pub fn push_stream_deltas<I, S>(&self, deltas: I, usage: Option<Usage>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<Result<StreamEvent>> = deltas
            .into_iter()
            .map(|d| Ok(StreamEvent::TextDelta { delta: d.into() }))
            .collect();
        events.push(Ok(StreamEvent::Done {
            usage,
            finish_reason: Some("stop".into()),
        }));
        self.push_stream(events);
    }

    /// Queue a failure to open the stream.
    pub fn push_stream_error(&self, err: Error) {
        self.script.lock().streams.push_back(Err(err));
    }

    // ── Inspection ─────────────────────────────────────────────────

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.script.lock().requests.last().cloned()
    }

    /// Stream events handed out so far, across all streams.
    pub fn events_pulled(&self) -> usize {
        self.events_pulled.load(Ordering::SeqCst)
    }

    fn exhausted(&self, kind: &str) -> Error {
        Error::Other(format!("scripted provider '{}' has no {kind} response queued", self.id))
    }
}

#[async_trait::async_trait]
impl ProviderClient for ScriptedProvider {
    async fn prompt(&self, req: PromptRequest) -> Result<TextResponse> {
        let mut script = self.script.lock();
        script.requests.push(RecordedRequest::Prompt(req));
        script
            .prompts
            .pop_front()
            .unwrap_or_else(|| Err(self.exhausted("text")))
    }

    async fn prompt_structured(&self, req: StructuredRequest) -> Result<ProviderResponse> {
        let mut script = self.script.lock();
        script.requests.push(RecordedRequest::Structured(req));
        script
            .structured
            .pop_front()
            .unwrap_or_else(|| Err(self.exhausted("structured")))
    }

    async fn stream(&self, req: PromptRequest) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let events = {
            let mut script = self.script.lock();
            script.requests.push(RecordedRequest::Stream(req));
            script
                .streams
                .pop_front()
                .unwrap_or_else(|| Err(self.exhausted("stream")))?
        };

        let pulled = self.events_pulled.clone();
        let stream = async_stream::stream! {
            for event in events {
                pulled.fetch_add(1, Ordering::SeqCst);
                yield event;
            }
        };
        Ok(Box::pin(stream))
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn pops_in_order_then_errors() {
        let p = ScriptedProvider::new("scripted");
        p.push_text("one", Usage::default());
        p.push_text("two", Usage::default());

        assert_eq!(p.prompt(PromptRequest::default()).await.unwrap().text, "one");
        assert_eq!(p.prompt(PromptRequest::default()).await.unwrap().text, "two");
        assert!(p.prompt(PromptRequest::default()).await.is_err());
        assert_eq!(p.requests().len(), 3);
    }

    #[tokio::test]
    async fn structured_payload_text_is_json() {
        let p = ScriptedProvider::new("scripted");
        p.push_structured(json!({"ok": true}), Usage::new(1, 2));
        let req = StructuredRequest {
            base: PromptRequest::default(),
            schema: crate::schema::TypedSchema::object(vec![]),
        };
        match p.prompt_structured(req).await.unwrap() {
            ProviderResponse::Structured(s) => {
                assert_eq!(s.text, r#"{"ok":true}"#);
                assert_eq!(s.usage, Usage::new(1, 2));
            }
            other => panic!("unexpected response: {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn stream_counts_pulled_events_lazily() {
        let p = ScriptedProvider::new("scripted");
        p.push_stream_deltas(["a", "b", "c"], None);

        let mut stream = p.stream(PromptRequest::default()).await.unwrap();
        assert_eq!(p.events_pulled(), 0);
        stream.next().await.unwrap().unwrap();
        assert_eq!(p.events_pulled(), 1);
        drop(stream);
        assert_eq!(p.events_pulled(), 1);
    }

    #[tokio::test]
    async fn stream_open_failure() {
        let p = ScriptedProvider::new("scripted");
        p.push_stream_error(Error::Timeout("connect".into()));
        let Err(err) = p.stream(PromptRequest::default()).await else {
            panic!("expected error");
        };
        assert!(matches!(err, Error::Timeout(_)));
        assert!(matches!(p.last_request(), Some(RecordedRequest::Stream(_))));
    }
}

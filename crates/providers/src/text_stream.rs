//! Accumulating wrapper around a provider event stream.
//!
//! Pull events one at a time with [`TextStream::next_event`]; text deltas
//! and the final usage report are recorded as they pass through, so
//! [`TextStream::text`] and [`TextStream::usage`] reflect exactly what was
//! consumed, whether or not the stream ran to the end.

use aa_domain::error::{Error, Result};
use aa_domain::stream::{BoxStream, StreamEvent, Usage};
use futures_util::StreamExt;

pub struct TextStream {
    provider: String,
    inner: BoxStream<'static, Result<StreamEvent>>,
    text: String,
    usage: Option<Usage>,
    finished: bool,
}

impl TextStream {
    pub fn new(
        provider: impl Into<String>,
        inner: BoxStream<'static, Result<StreamEvent>>,
    ) -> Self {
        Self {
            provider: provider.into(),
            inner,
            text: String::new(),
            usage: None,
            finished: false,
        }
    }

    /// Pull the next event.  `None` once the stream is exhausted or failed.
    ///
    /// An in-band `StreamEvent::Error` is surfaced as `Err(Error::Provider)`
    /// and ends the stream.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent>> {
        if self.finished {
            return None;
        }

        match self.inner.next().await {
            None => {
                self.finished = true;
                None
            }
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            Some(Ok(StreamEvent::Error { message })) => {
                self.finished = true;
                Some(Err(Error::Provider {
                    provider: self.provider.clone(),
                    message,
                }))
            }
            Some(Ok(event)) => {
                match &event {
                    StreamEvent::TextDelta { delta } => self.text.push_str(delta),
                    StreamEvent::Done { usage: Some(u), .. } => self.usage = Some(*u),
                    _ => {}
                }
                Some(Ok(event))
            }
        }
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Usage reported so far; `None` if the provider has not sent any yet.
    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

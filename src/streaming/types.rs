//! Core Streaming Types

use std::pin::Pin;

use futures::Stream;

use super::cancel::CancelHandle;
use crate::error::PreviewError;
use crate::terminal::is_terminal;
use crate::types::PreviewResponse;

/// Preview Stream - the incremental answer to one preview request.
///
/// Under normal operation it yields zero or more `Running` responses followed by exactly one
/// `Done` or `Error` response. `Err` items are client-side failures (connection, decoding).
pub type PreviewStream = Pin<Box<dyn Stream<Item = Result<PreviewResponse, PreviewError>> + Send>>;

/// Preview stream with first-class cancellation handle
///
/// This is the subscription handle returned by a transport: the stream is consumed by exactly
/// one subscriber and `cancel` ends it early.
pub struct PreviewStreamHandle {
    /// The underlying preview stream
    pub stream: PreviewStream,
    /// Handle to cancel the stream
    pub cancel: CancelHandle,
}

impl PreviewStreamHandle {
    /// Wrap `stream` so that it can be cancelled.
    pub fn new(stream: PreviewStream) -> Self {
        let (stream, cancel) = super::make_cancellable_stream(stream);
        Self { stream, cancel }
    }
}

impl std::fmt::Debug for PreviewStreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewStreamHandle")
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

/// Yield responses up to and including the first terminal one, then end.
///
/// `Err` items are passed through and also end the stream.
pub fn take_until_terminal(stream: PreviewStream) -> PreviewStream {
    let mut inner = stream;
    let s = async_stream::stream! {
        use futures::StreamExt;
        while let Some(item) = inner.next().await {
            let stop = match &item {
                Ok(response) => is_terminal(response),
                Err(_) => true,
            };
            yield item;
            if stop {
                break;
            }
        }
    };
    Box::pin(s)
}

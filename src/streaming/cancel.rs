//! Cancellation utilities
//!
//! Provides first-class cancellation handles for preview subscriptions.

use tokio_util::sync::CancellationToken;

use super::types::PreviewStream;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Streams observing this handle end at their next poll,
    /// including one already parked in `next()`. Calling it again has no effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Make a preview stream cancellable and return its cancel handle.
///
/// Dropping the wrapped stream drops the inner one, which closes the HTTP connection.
pub fn make_cancellable_stream(stream: PreviewStream) -> (PreviewStream, CancelHandle) {
    let handle = CancelHandle::new();
    let token = handle.token.clone();
    let mut inner = stream;
    let s = async_stream::stream! {
        use futures::StreamExt;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                item = inner.next() => {
                    let Some(item) = item else { break };
                    yield item;
                }
            }
        }
    };
    (Box::pin(s), handle)
}

/// Create a standalone cancel handle that can be shared across tasks.
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::new()
}

//! Outbound preview transport.
//!
//! A transport turns one [`PreviewRequest`] into one cancellable [`PreviewStreamHandle`].
//! [`HttpPreviewTransport`] talks to the rule testing API; tests and embedders can provide
//! their own implementation.

mod config;
mod http;

pub use config::{HttpTransportConfig, HttpTransportConfigBuilder};
pub use http::HttpPreviewTransport;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PreviewError;
use crate::streaming::PreviewStreamHandle;
use crate::types::PreviewRequest;

/// Opens preview streams.
#[async_trait]
pub trait PreviewTransport: Send + Sync {
    /// Send `request` and return a handle on the incremental response stream.
    ///
    /// Backend evaluation failures are delivered as an `Error` response on the stream;
    /// `Err` is reserved for failing to open the stream at all.
    async fn open_preview_stream(
        &self,
        request: PreviewRequest,
    ) -> Result<PreviewStreamHandle, PreviewError>;
}

#[async_trait]
impl<T> PreviewTransport for Arc<T>
where
    T: PreviewTransport + ?Sized,
{
    async fn open_preview_stream(
        &self,
        request: PreviewRequest,
    ) -> Result<PreviewStreamHandle, PreviewError> {
        (**self).open_preview_stream(request).await
    }
}

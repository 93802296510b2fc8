//! Test transport whose streams are driven by the test: every opened stream is handed to the
//! test as a `ScriptedStream` that emits responses on demand.

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use rule_preview::error::PreviewError;
use rule_preview::streaming::PreviewStreamHandle;
use rule_preview::transport::PreviewTransport;
use rule_preview::types::{PreviewRequest, PreviewResponse};
use tokio::sync::{Mutex, mpsc};

type Item = Result<PreviewResponse, PreviewError>;

/// One opened preview stream, as seen by the test.
pub struct ScriptedStream {
    pub request: PreviewRequest,
    tx: fmpsc::UnboundedSender<Item>,
}

impl ScriptedStream {
    /// Deliver `response`. Returns `false` once the subscriber dropped the stream.
    pub fn emit(&self, response: PreviewResponse) -> bool {
        self.tx.unbounded_send(Ok(response)).is_ok()
    }

    pub fn fail(&self, error: PreviewError) -> bool {
        self.tx.unbounded_send(Err(error)).is_ok()
    }

    /// End the stream without a terminal response.
    pub fn end(&self) {
        self.tx.close_channel();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Wait until the subscriber has dropped its end of the stream.
    pub async fn wait_closed(&self) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !self.tx.is_closed() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("subscriber should close the stream");
    }
}

pub struct ScriptedTransport {
    opened: mpsc::UnboundedSender<ScriptedStream>,
}

/// Receives the streams opened through a `ScriptedTransport`.
pub struct Openings {
    rx: Mutex<mpsc::UnboundedReceiver<ScriptedStream>>,
}

impl Openings {
    pub async fn next(&self) -> ScriptedStream {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("a preview stream should be opened")
            .expect("transport alive")
    }

    pub async fn none_within(&self, wait: Duration) -> bool {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(wait, rx.recv()).await.is_err()
    }
}

impl ScriptedTransport {
    pub fn new() -> (Self, Openings) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { opened: tx },
            Openings {
                rx: Mutex::new(rx),
            },
        )
    }
}

#[async_trait]
impl PreviewTransport for ScriptedTransport {
    async fn open_preview_stream(
        &self,
        request: PreviewRequest,
    ) -> Result<PreviewStreamHandle, PreviewError> {
        let (tx, rx) = fmpsc::unbounded::<Item>();
        self.opened
            .send(ScriptedStream { request, tx })
            .map_err(|_| PreviewError::HttpError("test harness dropped".into()))?;
        Ok(PreviewStreamHandle::new(Box::pin(rx)))
    }
}

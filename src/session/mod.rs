//! Preview session: trigger, stream, stop.
//!
//! A [`PreviewSession`] owns one result slot. Each [`PreviewSession::trigger`] builds a request
//! from a fresh draft snapshot, opens a subscription on a spawned task and returns at once.
//! The task publishes every response into the slot until the first terminal one.
//!
//! Two things stop a subscription from writing:
//! - a newer trigger: every subscription is tagged with a generation number and only the
//!   latest generation may write;
//! - disposal: the session flips from alive to defunct once and never writes again.
//!
//! Both checks run under the slot's write lock, so a write can never interleave with a
//! generation bump or with disposal.

mod source;

pub use source::{DataSourceGate, DraftSource, SharedGate, StaticGate};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::Instrument;

use crate::error::{PreviewError, Result};
use crate::request_builder::build_preview_request;
use crate::streaming::{CancelHandle, PreviewStream, new_cancel_handle};
use crate::terminal::is_terminal;
use crate::transport::PreviewTransport;
use crate::types::{PreviewRequest, PreviewResponse};

/// Session tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Longest accepted gap between two events of one subscription.
    ///
    /// `None` trusts the backend to always reach a terminal state.
    #[serde(default, with = "duration_option_millis")]
    pub stream_idle_timeout: Option<Duration>,
}

impl SessionOptions {
    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = Some(timeout);
        self
    }
}

/// What a call to [`PreviewSession::trigger`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A subscription tagged `generation` was started.
    Started { generation: u64 },
    /// Nothing happened.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Some referenced data source is unreachable.
    DataSourcesUnavailable,
    /// The session was disposed.
    Disposed,
}

/// Stateful preview orchestrator for one consumer.
pub struct PreviewSession {
    shared: Arc<Shared>,
    transport: Arc<dyn PreviewTransport>,
    drafts: Box<dyn DraftSource>,
    gate: Box<dyn DataSourceGate>,
    options: SessionOptions,
}

impl PreviewSession {
    pub fn new<T, D, G>(transport: T, drafts: D, gate: G) -> Self
    where
        T: PreviewTransport + 'static,
        D: DraftSource,
        G: DataSourceGate,
    {
        Self::with_options(transport, drafts, gate, SessionOptions::default())
    }

    pub fn with_options<T, D, G>(transport: T, drafts: D, gate: G, options: SessionOptions) -> Self
    where
        T: PreviewTransport + 'static,
        D: DraftSource,
        G: DataSourceGate,
    {
        Self {
            shared: Arc::new(Shared::new()),
            transport: Arc::new(transport),
            drafts: Box::new(drafts),
            gate: Box::new(gate),
            options,
        }
    }

    /// Start a preview of the current draft.
    ///
    /// Returns immediately; progress shows up in [`active_result`](Self::active_result).
    /// A no-op while a referenced data source is unreachable or after [`dispose`](Self::dispose).
    /// Any subscription started by an earlier trigger stops affecting the result.
    ///
    /// Fails with [`PreviewError::UnsupportedRuleKind`] when the draft's kind has no preview,
    /// which means the caller's gating is broken. Must be called within a tokio runtime.
    pub fn trigger(&self) -> Result<TriggerOutcome> {
        if !self.shared.is_alive() {
            tracing::debug!("preview trigger ignored: session disposed");
            return Ok(TriggerOutcome::Skipped(SkipReason::Disposed));
        }
        if !self.gate.all_data_sources_available() {
            tracing::debug!("preview trigger ignored: data sources unavailable");
            return Ok(TriggerOutcome::Skipped(SkipReason::DataSourcesUnavailable));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            PreviewError::ConfigurationError(
                "PreviewSession::trigger must be called within a tokio runtime".to_string(),
            )
        })?;

        let draft = self.drafts.snapshot();
        let request = build_preview_request(&draft)?;

        let cancel = new_cancel_handle();
        let Some(generation) = self.shared.advance(cancel.clone()) else {
            return Ok(TriggerOutcome::Skipped(SkipReason::Disposed));
        };

        let span = tracing::info_span!(
            "preview_subscription",
            generation,
            subscription_id = %uuid::Uuid::new_v4(),
            kind = %request.kind(),
        );
        tracing::info!(parent: &span, "preview triggered");
        runtime.spawn(
            run_subscription(
                self.shared.clone(),
                self.transport.clone(),
                request,
                generation,
                cancel,
                self.options.stream_idle_timeout,
            )
            .instrument(span),
        );

        Ok(TriggerOutcome::Started { generation })
    }

    /// Latest accepted response, if any.
    pub fn active_result(&self) -> Option<PreviewResponse> {
        self.shared.slot.borrow().clone()
    }

    /// Receiver notified on every accepted response.
    pub fn subscribe(&self) -> watch::Receiver<Option<PreviewResponse>> {
        self.shared.slot.subscribe()
    }

    /// Generation of the most recent trigger, `0` before the first one.
    pub fn current_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn is_alive(&self) -> bool {
        self.shared.is_alive()
    }

    /// Mark the session defunct and close the open subscription, if any.
    ///
    /// Idempotent. No response is written after this returns, even one already in flight.
    pub fn dispose(&self) {
        if self.shared.dispose() {
            tracing::info!("preview session disposed");
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSession")
            .field("alive", &self.is_alive())
            .field("generation", &self.current_generation())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// State shared between the session and its subscription tasks.
struct Shared {
    slot: watch::Sender<Option<PreviewResponse>>,
    generation: AtomicU64,
    lifetime: CancelHandle,
    subscription: Mutex<Option<CancelHandle>>,
}

impl Shared {
    fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot,
            generation: AtomicU64::new(0),
            lifetime: new_cancel_handle(),
            subscription: Mutex::new(None),
        }
    }

    fn is_alive(&self) -> bool {
        !self.lifetime.is_cancelled()
    }

    /// Start a new generation owned by `cancel`, closing the previous subscription.
    /// `None` once disposed.
    fn advance(&self, cancel: CancelHandle) -> Option<u64> {
        let mut next = None;
        self.slot.send_if_modified(|_| {
            if self.is_alive() {
                next = Some(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
                if let Some(previous) = self.swap_subscription(Some(cancel)) {
                    previous.cancel();
                }
            }
            false
        });
        next
    }

    /// Write `response` if `generation` is still current and the session alive.
    fn publish(&self, generation: u64, response: PreviewResponse) -> bool {
        self.slot.send_if_modified(|slot| {
            if !self.is_alive() || self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *slot = Some(response);
            true
        })
    }

    /// Returns `true` only for the call that actually disposed.
    fn dispose(&self) -> bool {
        let mut first = false;
        self.slot.send_if_modified(|_| {
            first = self.is_alive();
            self.lifetime.cancel();
            false
        });
        if let Some(current) = self.swap_subscription(None) {
            current.cancel();
        }
        first
    }

    fn swap_subscription(&self, next: Option<CancelHandle>) -> Option<CancelHandle> {
        let mut guard = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

async fn run_subscription(
    shared: Arc<Shared>,
    transport: Arc<dyn PreviewTransport>,
    request: PreviewRequest,
    generation: u64,
    cancel: CancelHandle,
    idle_timeout: Option<Duration>,
) {
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("subscription abandoned before the stream opened");
            return;
        }
        opened = transport.open_preview_stream(request) => opened,
    };

    let handle = match opened {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "failed to open preview stream");
            shared.publish(generation, PreviewResponse::failure(e.to_string()));
            return;
        }
    };
    let stream_cancel = handle.cancel;
    let mut stream = handle.stream;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("subscription abandoned");
                break;
            }
            next = next_event(&mut stream, idle_timeout) => next,
        };

        match next {
            Ok(Some(Ok(response))) => {
                let state = response.state;
                let terminal = is_terminal(&response);
                if !shared.publish(generation, response) {
                    tracing::debug!(?state, "dropping response from stale subscription");
                    break;
                }
                tracing::debug!(?state, "preview response published");
                if terminal {
                    break;
                }
            }
            Ok(Some(Err(e))) => {
                tracing::warn!(error = %e, "preview stream failed");
                shared.publish(generation, PreviewResponse::failure(e.to_string()));
                break;
            }
            Ok(None) => {
                tracing::warn!("preview stream ended without a terminal state");
                break;
            }
            Err(timeout) => {
                let e = PreviewError::StreamTimeout(timeout);
                tracing::warn!(error = %e, "preview stream idle for too long");
                shared.publish(generation, PreviewResponse::failure(e.to_string()));
                break;
            }
        }
    }

    stream_cancel.cancel();
}

/// Next stream item, or `Err(timeout)` if none arrived in time.
async fn next_event(
    stream: &mut PreviewStream,
    idle_timeout: Option<Duration>,
) -> std::result::Result<Option<Result<PreviewResponse>>, Duration> {
    match idle_timeout {
        Some(timeout) => tokio::time::timeout(timeout, stream.next())
            .await
            .map_err(|_| timeout),
        None => Ok(stream.next().await),
    }
}

mod duration_option_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests;

use super::*;
use crate::streaming::PreviewStreamHandle;
use crate::types::{AlertQuery, RuleDraft, RuleKind};
use async_trait::async_trait;
use std::sync::atomic::AtomicUsize;
use tracing_test::traced_test;

/// Replays a fixed list of responses for every opened stream.
struct ReplayTransport {
    responses: Vec<PreviewResponse>,
    opened: AtomicUsize,
}

impl ReplayTransport {
    fn new(responses: Vec<PreviewResponse>) -> Self {
        Self {
            responses,
            opened: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PreviewTransport for ReplayTransport {
    async fn open_preview_stream(&self, _request: PreviewRequest) -> Result<PreviewStreamHandle> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<PreviewResponse>> = self.responses.iter().cloned().map(Ok).collect();
        Ok(PreviewStreamHandle::new(Box::pin(futures::stream::iter(items))))
    }
}

struct FailingTransport;

#[async_trait]
impl PreviewTransport for FailingTransport {
    async fn open_preview_stream(&self, _request: PreviewRequest) -> Result<PreviewStreamHandle> {
        Err(PreviewError::HttpError("connection refused".into()))
    }
}

fn grafana_draft() -> RuleDraft {
    RuleDraft::grafana("B", vec![AlertQuery::new("A", "prom-1")])
}

fn payload(seq: u32) -> serde_json::Value {
    serde_json::json!({ "seq": seq })
}

async fn wait_for<F>(rx: &mut watch::Receiver<Option<PreviewResponse>>, mut done: F)
where
    F: FnMut(&Option<PreviewResponse>) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|v| done(v)))
        .await
        .expect("slot update in time")
        .expect("session alive");
}

#[test]
fn publish_requires_current_generation() {
    let shared = Shared::new();
    let first = shared.advance(new_cancel_handle()).unwrap();
    let second = shared.advance(new_cancel_handle()).unwrap();
    assert_eq!((first, second), (1, 2));

    assert!(!shared.publish(first, PreviewResponse::done(payload(1))));
    assert!(shared.slot.borrow().is_none());

    assert!(shared.publish(second, PreviewResponse::running(payload(2))));
    assert_eq!(
        *shared.slot.borrow(),
        Some(PreviewResponse::running(payload(2)))
    );
}

#[test]
fn advancing_cancels_the_previous_subscription() {
    let shared = Shared::new();
    let first = new_cancel_handle();
    shared.advance(first.clone()).unwrap();
    let second = new_cancel_handle();
    shared.advance(second.clone()).unwrap();

    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
}

#[test]
fn dispose_blocks_every_later_write() {
    let shared = Shared::new();
    let generation = shared.advance(new_cancel_handle()).unwrap();
    assert!(shared.publish(generation, PreviewResponse::running(payload(1))));

    assert!(shared.dispose());
    assert!(!shared.dispose());

    assert!(!shared.publish(generation, PreviewResponse::done(payload(2))));
    assert_eq!(
        *shared.slot.borrow(),
        Some(PreviewResponse::running(payload(1)))
    );
    assert!(shared.advance(new_cancel_handle()).is_none());
}

#[tokio::test]
async fn replayed_stream_stops_at_terminal_event() {
    let transport = Arc::new(ReplayTransport::new(vec![
        PreviewResponse::running(payload(1)),
        PreviewResponse::done(payload(2)),
        PreviewResponse::running(payload(3)),
    ]));
    let session = PreviewSession::new(transport.clone(), grafana_draft, StaticGate(true));
    let mut rx = session.subscribe();

    let outcome = session.trigger().unwrap();
    assert_eq!(outcome, TriggerOutcome::Started { generation: 1 });

    wait_for(&mut rx, |v| v.as_ref().is_some_and(is_terminal)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        session.active_result(),
        Some(PreviewResponse::done(payload(2)))
    );
    assert_eq!(transport.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn closed_gate_makes_trigger_a_no_op() {
    let transport = Arc::new(ReplayTransport::new(vec![PreviewResponse::done(payload(1))]));
    let session = PreviewSession::new(transport.clone(), grafana_draft, StaticGate(false));

    let outcome = session.trigger().unwrap();

    assert_eq!(
        outcome,
        TriggerOutcome::Skipped(SkipReason::DataSourcesUnavailable)
    );
    assert_eq!(session.current_generation(), 0);
    tokio::task::yield_now().await;
    assert_eq!(transport.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unsupported_kind_fails_loudly_without_opening_a_stream() {
    let transport = Arc::new(ReplayTransport::new(vec![]));
    let session = PreviewSession::new(
        transport.clone(),
        || RuleDraft::new(RuleKind::CloudRecording),
        StaticGate(true),
    );

    let err = session.trigger().unwrap_err();

    assert_eq!(err, PreviewError::UnsupportedRuleKind(RuleKind::CloudRecording));
    assert_eq!(session.current_generation(), 0);
    assert!(session.active_result().is_none());
}

#[tokio::test]
async fn trigger_after_dispose_is_skipped() {
    let session = PreviewSession::new(ReplayTransport::new(vec![]), grafana_draft, StaticGate(true));
    session.dispose();
    assert_eq!(
        session.trigger().unwrap(),
        TriggerOutcome::Skipped(SkipReason::Disposed)
    );
}

#[test]
fn trigger_outside_a_runtime_is_a_configuration_error() {
    let session = PreviewSession::new(ReplayTransport::new(vec![]), grafana_draft, StaticGate(true));
    assert!(matches!(
        session.trigger(),
        Err(PreviewError::ConfigurationError(_))
    ));
}

#[tokio::test]
async fn open_failure_is_reported_as_terminal_error() {
    let session = PreviewSession::new(FailingTransport, grafana_draft, StaticGate(true));
    let mut rx = session.subscribe();

    session.trigger().unwrap();
    wait_for(&mut rx, |v| v.is_some()).await;

    let result = session.active_result().unwrap();
    assert!(is_terminal(&result));
    assert!(
        result.payload["error"]
            .as_str()
            .unwrap()
            .contains("connection refused")
    );
}

#[tokio::test]
#[traced_test]
async fn stream_without_terminal_state_ends_quietly() {
    let session = PreviewSession::new(
        ReplayTransport::new(vec![PreviewResponse::running(payload(1))]),
        grafana_draft,
        StaticGate(true),
    );
    let mut rx = session.subscribe();

    session.trigger().unwrap();
    wait_for(&mut rx, |v| v.is_some()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        session.active_result(),
        Some(PreviewResponse::running(payload(1)))
    );
    assert!(logs_contain("preview stream ended without a terminal state"));
}

#[tokio::test(start_paused = true)]
async fn idle_timeout_closes_a_silent_stream() {
    struct SilentTransport;

    #[async_trait]
    impl PreviewTransport for SilentTransport {
        async fn open_preview_stream(
            &self,
            _request: PreviewRequest,
        ) -> Result<PreviewStreamHandle> {
            Ok(PreviewStreamHandle::new(Box::pin(futures::stream::pending())))
        }
    }

    let options = SessionOptions::default().with_stream_idle_timeout(Duration::from_secs(30));
    let session =
        PreviewSession::with_options(SilentTransport, grafana_draft, StaticGate(true), options);
    let mut rx = session.subscribe();

    session.trigger().unwrap();
    rx.changed().await.unwrap();

    let result = session.active_result().unwrap();
    assert!(is_terminal(&result));
    assert!(result.payload["error"].as_str().unwrap().contains("timed out"));
}

#[test]
fn session_options_serialize_timeout_in_millis() {
    let options = SessionOptions::default().with_stream_idle_timeout(Duration::from_secs(2));
    let json = serde_json::to_value(&options).unwrap();
    assert_eq!(json, serde_json::json!({"stream_idle_timeout": 2000}));

    let parsed: SessionOptions = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(parsed, SessionOptions::default());
}

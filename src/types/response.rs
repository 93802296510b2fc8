//! Streamed preview responses.

use serde::{Deserialize, Serialize};

/// Evaluation state carried by each streamed response.
///
/// The backend reports finer loading states (`NotStarted`, `Loading`, `Streaming`); they all
/// mean the evaluation is still in progress and are read as [`PreviewState::Running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviewState {
    #[serde(alias = "NotStarted", alias = "Loading", alias = "Streaming")]
    Running,
    Done,
    Error,
}

impl PreviewState {
    /// `Done` and `Error` end a preview stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// One element of a preview stream.
///
/// `payload` is whatever the backend sent (frames, diagnostics) and is never inspected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub state: PreviewState,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl PreviewResponse {
    pub fn new(state: PreviewState, payload: serde_json::Value) -> Self {
        Self { state, payload }
    }

    pub fn running(payload: serde_json::Value) -> Self {
        Self::new(PreviewState::Running, payload)
    }

    pub fn done(payload: serde_json::Value) -> Self {
        Self::new(PreviewState::Done, payload)
    }

    pub fn error(payload: serde_json::Value) -> Self {
        Self::new(PreviewState::Error, payload)
    }

    /// Terminal `Error` response describing a client-side failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::error(serde_json::json!({ "error": message.into() }))
    }
}

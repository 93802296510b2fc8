//! Core error types.

use std::time::Duration;

use thiserror::Error;

use crate::types::RuleKind;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Errors produced while building, opening or following a rule preview.
///
/// A backend evaluation failure is *not* an error here: it arrives as a
/// [`PreviewState::Error`](crate::types::PreviewState::Error) response on the stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// The rule kind has no preview request shape.
    ///
    /// Callers gate the trigger on the rule kind, so reaching this is a defect in that gating.
    #[error("Alert type {0} not supported by preview")]
    UnsupportedRuleKind(RuleKind),

    /// Connection or protocol failure talking to the preview endpoint.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The backend rejected the request outright.
    #[error("API error {code}: {message}")]
    ApiError { code: u16, message: String },

    /// A streamed frame or response body could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// No event arrived within the configured idle window.
    #[error("preview stream timed out after {0:?} without a new event")]
    StreamTimeout(Duration),

    /// The tracing subscriber could not be installed.
    #[error("Telemetry initialization error: {0}")]
    TelemetryInit(String),
}

impl PreviewError {
    /// Whether this error signals a broken caller contract rather than a runtime failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnsupportedRuleKind(_))
    }

    /// Whether retrying the same preview could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) | Self::StreamTimeout(_) => true,
            Self::ApiError { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Short text suitable for the result panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::HttpError(_) => "Could not reach the preview service.".to_string(),
            Self::StreamTimeout(_) => "The preview did not finish in time.".to_string(),
            Self::ApiError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

//! Conversions from third-party error types.

use super::types::PreviewError;

impl From<reqwest::Error> for PreviewError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::ParseError(err.to_string());
        }
        match err.status() {
            Some(status) => Self::ApiError {
                code: status.as_u16(),
                message: err.to_string(),
            },
            None => Self::HttpError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<eventsource_stream::EventStreamError<reqwest::Error>> for PreviewError {
    fn from(err: eventsource_stream::EventStreamError<reqwest::Error>) -> Self {
        match err {
            eventsource_stream::EventStreamError::Transport(e) => e.into(),
            other => Self::ParseError(format!("SSE error: {other}")),
        }
    }
}

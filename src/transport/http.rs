//! HTTP preview transport backed by `reqwest`.
//!
//! Requests go to the rule testing API:
//! - Grafana-managed rules: `POST {base_url}/api/v1/rule/test/grafana`
//! - cloud alerting rules: `POST {base_url}/api/v1/rule/test/{dataSourceName}`
//!
//! The backend either answers with a `text/event-stream` of JSON [`PreviewResponse`] frames or
//! with a single JSON document. Both are exposed as a [`PreviewStream`] that starts with a
//! synthetic `Running` response so renderers can show a loading state right away.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;

use super::{HttpTransportConfig, PreviewTransport};
use crate::defaults::endpoints;
use crate::error::{PreviewError, Result};
use crate::streaming::{PreviewStream, PreviewStreamHandle, take_until_terminal};
use crate::types::{PreviewRequest, PreviewResponse};

/// Preview transport speaking HTTP to the alerting backend.
#[derive(Debug, Clone)]
pub struct HttpPreviewTransport {
    config: HttpTransportConfig,
    client: reqwest::Client,
}

impl HttpPreviewTransport {
    /// Build a transport with its own `reqwest::Client`.
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| {
            PreviewError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_client(config, client))
    }

    /// Build a transport reusing an existing client.
    pub fn with_client(config: HttpTransportConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Endpoint URL for `request`.
    pub fn endpoint(&self, request: &PreviewRequest) -> String {
        match request {
            PreviewRequest::Grafana { .. } => {
                format!("{}{}", self.config.base_url, endpoints::GRAFANA_RULE_TEST)
            }
            PreviewRequest::CloudAlerting {
                data_source_name, ..
            } => format!(
                "{}{}{}",
                self.config.base_url,
                endpoints::CLOUD_RULE_TEST_PREFIX,
                urlencoding::encode(data_source_name)
            ),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                PreviewError::ConfigurationError(format!("Invalid header name {key:?}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                PreviewError::ConfigurationError(format!("Invalid value for header {key:?}: {e}"))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl PreviewTransport for HttpPreviewTransport {
    async fn open_preview_stream(&self, request: PreviewRequest) -> Result<PreviewStreamHandle> {
        let url = self.endpoint(&request);
        let mut rb = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request);
        if let Some(key) = &self.config.api_key {
            rb = rb.bearer_auth(key.expose_secret());
        }
        tracing::debug!(%url, kind = %request.kind(), "opening preview stream");

        // The request is sent inside the stream so that cancelling the handle also aborts
        // the handshake.
        Ok(PreviewStreamHandle::new(take_until_terminal(response_stream(rb))))
    }
}

fn response_stream(rb: reqwest::RequestBuilder) -> PreviewStream {
    let s = async_stream::stream! {
        yield Ok(PreviewResponse::running(serde_json::Value::Null));

        let response = match rb.send().await {
            Ok(response) => response,
            Err(e) => {
                yield Err(PreviewError::HttpError(format!("Failed to send request: {e}")));
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "preview request rejected by backend");
            yield Ok(rejection(status.as_u16(), &body));
            return;
        }

        if is_event_stream(response.headers()) {
            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                match event {
                    Ok(event) if event.data.trim().is_empty() => continue,
                    Ok(event) => {
                        yield serde_json::from_str::<PreviewResponse>(&event.data).map_err(|e| {
                            PreviewError::ParseError(format!("Invalid preview frame: {e}"))
                        });
                    }
                    Err(e) => {
                        yield Err(PreviewError::from(e));
                        return;
                    }
                }
            }
        } else {
            match response.bytes().await {
                Ok(body) => {
                    yield single_document(&body);
                }
                Err(e) => {
                    yield Err(PreviewError::from(e));
                }
            }
        }
    };
    Box::pin(s)
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"))
}

/// Non-streaming answer: a full response if it carries a `state`, otherwise a `Done` payload.
fn single_document(body: &[u8]) -> Result<PreviewResponse> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if value.get("state").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    Ok(PreviewResponse::done(value))
}

/// Terminal `Error` response for a non-success status; the backend's `message` is preferred.
fn rejection(status: u16, body: &str) -> PreviewResponse {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    PreviewResponse::error(serde_json::json!({ "status": status, "error": message }))
}

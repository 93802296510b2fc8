//! HTTP transport configuration.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;

use crate::defaults;
use crate::error::{PreviewError, Result};

/// Configuration for [`HttpPreviewTransport`](super::HttpPreviewTransport).
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the alerting backend, without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: Option<SecretString>,
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// User agent
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::http::BASE_URL.to_string(),
            api_key: None,
            timeout: Some(defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(defaults::http::CONNECT_TIMEOUT),
            headers: HashMap::new(),
            user_agent: Some(defaults::http::USER_AGENT.to_string()),
        }
    }
}

impl HttpTransportConfig {
    /// Returns a builder for constructing `HttpTransportConfig`
    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::new()
    }

    /// Read `RULE_PREVIEW_BASE_URL` and `RULE_PREVIEW_API_KEY`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(defaults::env::BASE_URL) {
            builder = builder.base_url(url);
        }
        if let Ok(key) = std::env::var(defaults::env::API_KEY) {
            builder = builder.api_key(key);
        }
        builder.build()
    }
}

/// Builder for `HttpTransportConfig`
#[derive(Debug, Clone, Default)]
pub struct HttpTransportConfigBuilder {
    base_url: Option<String>,
    api_key: Option<SecretString>,
    timeout: Option<Option<Duration>>,
    connect_timeout: Option<Option<Duration>>,
    headers: HashMap<String, String>,
    user_agent: Option<String>,
}

impl HttpTransportConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration, validating the base URL.
    pub fn build(self) -> Result<HttpTransportConfig> {
        let defaults = HttpTransportConfig::default();
        let base_url = self
            .base_url
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PreviewError::ConfigurationError(format!(
                "base_url must start with http:// or https://, got {base_url:?}"
            )));
        }
        Ok(HttpTransportConfig {
            base_url,
            api_key: self.api_key,
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            headers: self.headers,
            user_agent: self.user_agent.or(defaults.user_agent),
        })
    }
}

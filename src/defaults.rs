//! Default values shared by the transport, session and telemetry configuration.

/// HTTP defaults.
pub mod http {
    use std::time::Duration;

    /// Base URL used when none is configured.
    pub const BASE_URL: &str = "http://localhost:3000";
    /// Request timeout for the whole preview exchange.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// User agent sent with preview requests.
    pub const USER_AGENT: &str = concat!("rule-preview/", env!("CARGO_PKG_VERSION"));
}

/// Backend preview endpoints.
pub mod endpoints {
    /// Path for previews of Grafana-managed rules.
    pub const GRAFANA_RULE_TEST: &str = "/api/v1/rule/test/grafana";
    /// Path prefix for previews evaluated by an external ruler; the data source name follows.
    pub const CLOUD_RULE_TEST_PREFIX: &str = "/api/v1/rule/test/";
}

/// Environment variable names.
pub mod env {
    pub const BASE_URL: &str = "RULE_PREVIEW_BASE_URL";
    pub const API_KEY: &str = "RULE_PREVIEW_API_KEY";
    pub const LOG_LEVEL: &str = "RULE_PREVIEW_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "RULE_PREVIEW_LOG_FORMAT";
    pub const LOG_FILE: &str = "RULE_PREVIEW_LOG_FILE";
}

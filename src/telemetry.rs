//! Telemetry and tracing utilities
//!
//! This module provides utilities for initializing and configuring tracing subscribers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rule_preview::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! // Keep the guard alive for as long as file logging should be flushed.
//! let _guard = init_subscriber(
//!     SubscriberConfig::builder()
//!         .log_level(tracing::Level::DEBUG)
//!         .output_format(OutputFormat::Json)
//!         .build(),
//! )?;
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::defaults;
use crate::error::{PreviewError, Result};

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl std::str::FromStr for OutputFormat {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            _ => Err(PreviewError::TelemetryInit(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Log level
    pub log_level: tracing::Level,
    /// Output format
    pub output_format: OutputFormat,
    /// Log file path (optional); logs go to stdout when unset
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    /// Create a new builder for SubscriberConfig
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Create a debug configuration
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// Filter directive limiting output to this crate at the configured level.
    pub fn filter_directive(&self) -> String {
        let level = self.log_level.as_str().to_lowercase();
        format!("{}={level}", env!("CARGO_CRATE_NAME"))
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    /// Set the log level
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self> {
        let level = level.parse::<tracing::Level>().map_err(|_| {
            PreviewError::TelemetryInit(format!(
                "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
            ))
        })?;
        self.log_level = Some(level);
        Ok(self)
    }

    /// Set the output format
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set the log file path
    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    /// Build the configuration
    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            log_file: self.log_file,
        }
    }
}

/// Initialize tracing subscriber with the given configuration
///
/// Output goes through a non-blocking writer; keep the returned guard alive for the duration
/// of the program so buffered lines are flushed. An already installed global subscriber is left
/// in place and `Ok(None)` is returned.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(config.filter_directive())
        .map_err(|e| PreviewError::TelemetryInit(format!("Invalid filter: {e}")))?;

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            (writer, Some(guard))
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            (writer, Some(guard))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);

    let init_result = match config.output_format {
        OutputFormat::Json => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .flatten_event(true)
            .try_init(),
        OutputFormat::Text => builder.try_init(),
    };

    // Handle the case where tracing is already initialized
    match init_result {
        Ok(()) => Ok(guard),
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("global default trace dispatcher has already been set") {
                Ok(None)
            } else {
                Err(PreviewError::TelemetryInit(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        }
    }
}

fn file_appender(path: &Path) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let file_name = path.file_name().ok_or_else(|| {
        PreviewError::TelemetryInit(format!("Log file path has no file name: {}", path.display()))
    })?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .map_err(|e| PreviewError::TelemetryInit(format!("Failed to open log file: {e}")))
}

/// Initialize tracing subscriber with default configuration
pub fn init_default() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::default())
}

/// Initialize tracing subscriber for debugging
pub fn init_debug() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::debug())
}

/// Build a subscriber configuration from environment variables
///
/// Supported environment variables:
/// - `RULE_PREVIEW_LOG_LEVEL`: Log level (trace, debug, info, warn, error)
/// - `RULE_PREVIEW_LOG_FORMAT`: Output format (text, json, json-compact)
/// - `RULE_PREVIEW_LOG_FILE`: Log file path
pub fn config_from_env() -> Result<SubscriberConfig> {
    let mut builder = SubscriberConfig::builder();

    if let Ok(level) = std::env::var(defaults::env::LOG_LEVEL) {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var(defaults::env::LOG_FORMAT) {
        builder = builder.output_format(format.parse()?);
    }
    if let Ok(file_path) = std::env::var(defaults::env::LOG_FILE) {
        builder = builder.log_file(PathBuf::from(file_path));
    }

    Ok(builder.build())
}

/// Initialize tracing subscriber from environment variables, see [`config_from_env`].
pub fn init_from_env() -> Result<Option<WorkerGuard>> {
    init_subscriber(config_from_env()?)
}

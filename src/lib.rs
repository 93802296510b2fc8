//! rule-preview
//!
//! Client-side orchestration for alert rule previews: build a preview request from the rule
//! being edited, open the backend's incremental response stream, publish every accepted
//! response into a result slot, and stop observing once the backend reports `Done` or `Error`.
//!
//! ```rust,ignore
//! use rule_preview::prelude::*;
//!
//! let transport = HttpPreviewTransport::new(HttpTransportConfig::from_env()?)?;
//! let session = PreviewSession::new(transport, move || form.snapshot(), gate.clone());
//!
//! session.trigger()?;
//! let mut results = session.subscribe();
//! while results.changed().await.is_ok() {
//!     render(results.borrow().as_ref());
//! }
//! ```
#![deny(unsafe_code)]

pub mod availability;
pub mod defaults;
pub mod error;
pub mod request_builder;
pub mod session;
pub mod streaming;
pub mod telemetry;
pub mod terminal;
pub mod transport;
pub mod types;

pub use error::{PreviewError, Result};

/// Commonly used items.
pub mod prelude {
    pub use crate::availability::{PreviewAvailability, preview_availability};
    pub use crate::error::{PreviewError, Result};
    pub use crate::request_builder::{build_preview_request, build_preview_request_at};
    pub use crate::session::{
        DataSourceGate, DraftSource, PreviewSession, SessionOptions, SharedGate, SkipReason,
        StaticGate, TriggerOutcome,
    };
    pub use crate::streaming::{CancelHandle, PreviewStream, PreviewStreamHandle};
    pub use crate::terminal::is_terminal;
    pub use crate::transport::{HttpPreviewTransport, HttpTransportConfig, PreviewTransport};
    pub use crate::types::{
        AlertQuery, PreviewRequest, PreviewResponse, PreviewState, RelativeTimeRange, RuleDraft,
        RuleKind,
    };
}

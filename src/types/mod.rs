//! Data model for rule previews.
//!
//! - [`RuleDraft`]: read-only snapshot of the rule being edited
//! - [`PreviewRequest`]: what gets sent to the backend
//! - [`PreviewResponse`]: one element of the streamed answer

mod draft;
mod request;
mod response;

pub use draft::{AlertQuery, RelativeTimeRange, RuleDraft, RuleKind};
pub use request::PreviewRequest;
pub use response::{PreviewResponse, PreviewState};

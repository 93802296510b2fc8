//! Preview request construction.
//!
//! Maps a [`RuleDraft`] snapshot to exactly one [`PreviewRequest`] shape. Pure apart from
//! reading the wall clock once in [`build_preview_request`].

use chrono::{DateTime, Utc};

use crate::error::{PreviewError, Result};
use crate::types::{PreviewRequest, RuleDraft, RuleKind};

/// Build the preview request for `draft`, anchoring Grafana evaluations at the current time.
///
/// Fails with [`PreviewError::UnsupportedRuleKind`] for recording rules.
pub fn build_preview_request(draft: &RuleDraft) -> Result<PreviewRequest> {
    build_preview_request_at(draft, Utc::now())
}

/// Same as [`build_preview_request`] with an explicit clock reading.
pub fn build_preview_request_at(draft: &RuleDraft, now: DateTime<Utc>) -> Result<PreviewRequest> {
    // Untouched form fields are empty strings in the form store.
    let text = |field: &Option<String>| field.clone().unwrap_or_default();

    match draft.kind {
        RuleKind::CloudAlerting => Ok(PreviewRequest::CloudAlerting {
            data_source_name: text(&draft.data_source_name),
            expr: text(&draft.expression),
        }),
        RuleKind::GrafanaManaged => Ok(PreviewRequest::Grafana {
            condition: text(&draft.condition),
            data: draft.queries.clone(),
            now,
        }),
        kind => Err(PreviewError::UnsupportedRuleKind(kind)),
    }
}

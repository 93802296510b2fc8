//! Whether the preview affordance should be offered for a draft.
//!
//! The rule editor only shows the preview action for Grafana-managed rules, enables it once a
//! condition is selected, and replaces it with a warning while any referenced data source is
//! unreachable. [`PreviewSession::trigger`](crate::session::PreviewSession::trigger) re-checks
//! the data source gate on its own.

use serde::Serialize;

use crate::types::{RuleDraft, RuleKind};

const DATA_SOURCES_UNAVAILABLE: &str = "Cannot display the query preview. Some of the data sources used in the queries are not available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewAvailability {
    /// Preview can be triggered.
    Available,
    /// The rule kind is not previewed from the editor; hide the affordance.
    UnsupportedRuleKind,
    /// No condition selected yet; show the affordance disabled.
    MissingCondition,
    /// Some referenced data source is unreachable; show [`PreviewAvailability::warning`].
    DataSourcesUnavailable,
}

impl PreviewAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether the preview affordance is rendered at all.
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Available | Self::MissingCondition)
    }

    /// Warning shown in place of the affordance, if any.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Self::DataSourcesUnavailable => Some(DATA_SOURCES_UNAVAILABLE),
            _ => None,
        }
    }
}

/// Decide how the preview affordance should look for `draft`.
pub fn preview_availability(
    draft: &RuleDraft,
    all_data_sources_available: bool,
) -> PreviewAvailability {
    if draft.kind != RuleKind::GrafanaManaged {
        return PreviewAvailability::UnsupportedRuleKind;
    }
    if !all_data_sources_available {
        return PreviewAvailability::DataSourcesUnavailable;
    }
    if !draft.has_condition() {
        return PreviewAvailability::MissingCondition;
    }
    PreviewAvailability::Available
}

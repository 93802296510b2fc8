//! Rule draft snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of alert rule being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Rule evaluated by the alerting backend itself.
    #[serde(rename = "grafana")]
    GrafanaManaged,
    /// Alerting rule evaluated by an external ruler data source.
    #[serde(rename = "cloud-alerting")]
    CloudAlerting,
    /// Recording rule evaluated by an external ruler data source.
    #[serde(rename = "cloud-recording")]
    CloudRecording,
}

impl RuleKind {
    /// Wire name used by the form store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrafanaManaged => "grafana",
            Self::CloudAlerting => "cloud-alerting",
            Self::CloudRecording => "cloud-recording",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative evaluation window of a query, in seconds before `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeTimeRange {
    pub from: u64,
    pub to: u64,
}

/// One query of a Grafana-managed rule.
///
/// `model` is the data source specific query body and is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub ref_id: String,
    pub datasource_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_time_range: Option<RelativeTimeRange>,
    #[serde(default)]
    pub model: serde_json::Value,
}

impl AlertQuery {
    pub fn new(ref_id: impl Into<String>, datasource_uid: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            datasource_uid: datasource_uid.into(),
            query_type: None,
            relative_time_range: None,
            model: serde_json::Value::Null,
        }
    }

    pub fn with_model(mut self, model: serde_json::Value) -> Self {
        self.model = model;
        self
    }

    pub fn with_relative_time_range(mut self, from: u64, to: u64) -> Self {
        self.relative_time_range = Some(RelativeTimeRange { from, to });
        self
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = Some(query_type.into());
        self
    }
}

/// Point-in-time copy of the preview-relevant fields of the rule under edit.
///
/// The form store owns the live values; a draft is taken once per trigger and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default)]
    pub data_source_name: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub queries: Vec<AlertQuery>,
    #[serde(default)]
    pub expression: Option<String>,
}

impl RuleDraft {
    /// Empty draft of the given kind.
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            data_source_name: None,
            condition: None,
            queries: Vec::new(),
            expression: None,
        }
    }

    /// Grafana-managed draft with its condition and queries.
    pub fn grafana(condition: impl Into<String>, queries: Vec<AlertQuery>) -> Self {
        Self::new(RuleKind::GrafanaManaged)
            .with_condition(condition)
            .with_queries(queries)
    }

    /// Cloud alerting draft targeting `data_source_name` with `expression`.
    pub fn cloud_alerting(
        data_source_name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self::new(RuleKind::CloudAlerting)
            .with_data_source_name(data_source_name)
            .with_expression(expression)
    }

    pub fn with_data_source_name(mut self, name: impl Into<String>) -> Self {
        self.data_source_name = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_queries(mut self, queries: Vec<AlertQuery>) -> Self {
        self.queries = queries;
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// True when a non-blank condition is selected.
    pub fn has_condition(&self) -> bool {
        self.condition
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_kind_uses_form_store_names() {
        let json = serde_json::to_string(&RuleKind::CloudAlerting).unwrap();
        assert_eq!(json, r#""cloud-alerting""#);
        let kind: RuleKind = serde_json::from_str(r#""grafana""#).unwrap();
        assert_eq!(kind, RuleKind::GrafanaManaged);
    }

    #[test]
    fn draft_deserializes_from_form_values() {
        let draft: RuleDraft = serde_json::from_value(serde_json::json!({
            "type": "grafana",
            "condition": "B",
            "queries": [
                {"refId": "A", "datasourceUid": "prom-1", "relativeTimeRange": {"from": 600, "to": 0}, "model": {"expr": "up"}}
            ]
        }))
        .unwrap();

        assert_eq!(draft.kind, RuleKind::GrafanaManaged);
        assert_eq!(draft.condition.as_deref(), Some("B"));
        assert_eq!(draft.queries.len(), 1);
        assert_eq!(
            draft.queries[0].relative_time_range,
            Some(RelativeTimeRange { from: 600, to: 0 })
        );
        assert!(draft.expression.is_none());
    }

    #[test]
    fn blank_condition_is_not_a_condition() {
        assert!(!RuleDraft::grafana("  ", vec![]).has_condition());
        assert!(!RuleDraft::new(RuleKind::GrafanaManaged).has_condition());
        assert!(RuleDraft::grafana("C", vec![]).has_condition());
    }
}

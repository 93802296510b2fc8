//! Preview request shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::draft::{AlertQuery, RuleKind};

/// Request sent to the preview endpoint. Built once per trigger and never mutated.
///
/// On the wire the two variants are told apart by their fields:
///
/// ```json
/// {"dataSourceName": "prom", "expr": "up == 0"}
/// {"grafana_condition": {"condition": "B", "data": [...], "now": "2024-05-01T10:00:00.000Z"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireRequest", from = "WireRequest")]
pub enum PreviewRequest {
    /// Evaluated by an external ruler data source.
    CloudAlerting {
        data_source_name: String,
        expr: String,
    },
    /// Evaluated by the alerting backend over `data`, anchored at `now`.
    Grafana {
        condition: String,
        data: Vec<AlertQuery>,
        now: DateTime<Utc>,
    },
}

impl PreviewRequest {
    /// Rule kind this request was built for.
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::CloudAlerting { .. } => RuleKind::CloudAlerting,
            Self::Grafana { .. } => RuleKind::GrafanaManaged,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireRequest {
    Grafana {
        grafana_condition: WireGrafanaCondition,
    },
    CloudAlerting {
        #[serde(rename = "dataSourceName")]
        data_source_name: String,
        expr: String,
    },
}

#[derive(Serialize, Deserialize)]
struct WireGrafanaCondition {
    condition: String,
    data: Vec<AlertQuery>,
    #[serde(with = "iso_millis")]
    now: DateTime<Utc>,
}

impl From<PreviewRequest> for WireRequest {
    fn from(request: PreviewRequest) -> Self {
        match request {
            PreviewRequest::CloudAlerting {
                data_source_name,
                expr,
            } => Self::CloudAlerting {
                data_source_name,
                expr,
            },
            PreviewRequest::Grafana {
                condition,
                data,
                now,
            } => Self::Grafana {
                grafana_condition: WireGrafanaCondition {
                    condition,
                    data,
                    now,
                },
            },
        }
    }
}

impl From<WireRequest> for PreviewRequest {
    fn from(wire: WireRequest) -> Self {
        match wire {
            WireRequest::CloudAlerting {
                data_source_name,
                expr,
            } => Self::CloudAlerting {
                data_source_name,
                expr,
            },
            WireRequest::Grafana { grafana_condition } => Self::Grafana {
                condition: grafana_condition.condition,
                data: grafana_condition.data,
                now: grafana_condition.now,
            },
        }
    }
}

// ISO-8601 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(now: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&now.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

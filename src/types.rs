// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Wire types of the events and analytics API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use crate::query::operator::Operator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub service: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub enqueued: u64,
    #[serde(default)]
    pub dropped: u64,
    #[serde(default)]
    pub pending: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub previous: String,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        !self.next.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        !self.previous.is_empty()
    }
}

/// The response envelope used by every `/v1` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: String::new(),
            pagination: None,
            data: Some(data),
        }
    }
}

impl<T: Default> ApiResponse<T> {
    /// The payload, or its default when the backend omitted it.
    pub fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// Labels with a known, finite set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Service,
    Env,
    Name,
    Level,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::Service, Label::Env, Label::Name, Label::Level];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Service => "service",
            Label::Env => "env",
            Label::Name => "name",
            Label::Level => "level",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured filter as sent in analytics request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsFilter {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl AnalyticsFilter {
    pub fn new(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Count,
    CountUnique,
    Sum,
    Avg,
    Min,
    Max,
    P50,
    P90,
    P95,
    P99,
}

impl Aggregation {
    pub const ALL: [Aggregation; 10] = [
        Aggregation::Count,
        Aggregation::CountUnique,
        Aggregation::Sum,
        Aggregation::Avg,
        Aggregation::Min,
        Aggregation::Max,
        Aggregation::P50,
        Aggregation::P90,
        Aggregation::P95,
        Aggregation::P99,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Count => "Count",
            Aggregation::CountUnique => "Count Unique",
            Aggregation::Sum => "Sum",
            Aggregation::Avg => "Average",
            Aggregation::Min => "Minimum",
            Aggregation::Max => "Maximum",
            Aggregation::P50 => "P50 (Median)",
            Aggregation::P90 => "P90",
            Aggregation::P95 => "P95",
            Aggregation::P99 => "P99",
        }
    }

    /// Everything but a plain count reduces over a field.
    pub fn needs_field(&self) -> bool {
        !matches!(self, Aggregation::Count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Minute,
    #[default]
    Hour,
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute => "minute",
            Interval::Hour => "hour",
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    pub aggregation: Aggregation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub group_by: Vec<String>,
    pub filters: Vec<AnalyticsFilter>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesQuery {
    pub aggregation: Aggregation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub interval: Interval,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub group_by: Vec<String>,
    pub filters: Vec<AnalyticsFilter>,
    pub from: String,
    pub to: String,
    pub fill_zeros: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopNQuery {
    pub aggregation: Aggregation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub group_by: String,
    pub filters: Vec<AnalyticsFilter>,
    pub from: String,
    pub to: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeQuery {
    pub aggregation: Aggregation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub filters: Vec<AnalyticsFilter>,
    pub from: String,
    pub to: String,
}

/// Compare takes the same body as a gauge; the backend derives the
/// previous period from the length of `from..to`.
pub type CompareQuery = GaugeQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: String,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub series: Vec<TimeSeriesSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopNDataPoint {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopNResponse {
    #[serde(default)]
    pub data: Vec<TopNDataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeResponse {
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub previous: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
}

/// One group of a generic analytics query. Without a `group_by` the
/// backend returns a single group with empty `groups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    #[serde(default)]
    pub groups: HashMap<String, String>,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(default)]
    pub results: Vec<AnalyticsResult>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_envelope_defaults() {
        let response: ApiResponse<Vec<Event>> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.pagination.is_none());
        assert!(response.into_data().is_empty());

        let response: ApiResponse<TimeSeriesResponse> =
            serde_json::from_str(r#"{"success": true, "message": "", "data": {}}"#).unwrap();
        assert!(response.into_data().series.is_empty());
    }

    #[test]
    fn test_event_decode() {
        let event: Event = serde_json::from_str(
            r#"{"timestamp": "2025-01-01T00:00:00Z", "service": "users", "name": "login",
                "level": "error", "data": {"duration": 120}}"#,
        )
        .unwrap();
        assert_eq!(event.service, "users");
        assert_eq!(event.level.as_deref(), Some("error"));
        assert_eq!(event.data.unwrap()["duration"], serde_json::json!(120));
        assert!(event.trace_id.is_none());
    }

    #[test]
    fn test_query_body() {
        let query = TopNQuery {
            aggregation: Aggregation::CountUnique,
            group_by: "service".to_string(),
            filters: vec![AnalyticsFilter::new("level", Operator::Eq, "error")],
            from: "a".to_string(),
            to: "b".to_string(),
            limit: 5,
            ..Default::default()
        };
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["aggregation"], "count_unique");
        assert_eq!(body["filters"][0]["operator"], "eq");
        assert!(body.get("field").is_none());
    }

    #[test]
    fn test_timeseries_body_omits_empty_group_by() {
        let query = TimeSeriesQuery {
            interval: Interval::Minute,
            fill_zeros: true,
            ..Default::default()
        };
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["interval"], "minute");
        assert!(body.get("group_by").is_none());
    }
}

// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! An in-memory backend for controller tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::Backend;
use crate::error::ApiError;
use crate::filters::EventQuery;
use crate::types::*;

#[derive(Default)]
struct State {
    events: Vec<Event>,
    pagination: Option<Pagination>,
    labels: HashMap<Label, Vec<String>>,
    data_keys: Vec<String>,
    data_values: Vec<String>,
    gauge: f64,
    series: Vec<TimeSeriesSeries>,
    topn: Vec<TopNDataPoint>,
    compare: Option<CompareResponse>,
    failing: HashSet<String>,
    calls: Vec<String>,
    bodies: Vec<(String, Value)>,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<State>,
}

impl MockBackend {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn set_events(&self, events: Vec<Event>, pagination: Option<Pagination>) {
        self.with(|s| {
            s.events = events;
            s.pagination = pagination;
        });
    }

    pub fn set_labels(&self, label: Label, values: &[&str]) {
        self.with(|s| {
            s.labels
                .insert(label, values.iter().map(|v| v.to_string()).collect())
        });
    }

    pub fn set_data_keys(&self, keys: &[&str]) {
        self.with(|s| s.data_keys = keys.iter().map(|v| v.to_string()).collect());
    }

    pub fn set_data_values(&self, values: &[&str]) {
        self.with(|s| s.data_values = values.iter().map(|v| v.to_string()).collect());
    }

    pub fn set_gauge(&self, value: f64) {
        self.with(|s| s.gauge = value);
    }

    pub fn set_series(&self, series: Vec<TimeSeriesSeries>) {
        self.with(|s| s.series = series);
    }

    pub fn set_topn(&self, data: Vec<TopNDataPoint>) {
        self.with(|s| s.topn = data);
    }

    pub fn set_compare(&self, compare: Option<CompareResponse>) {
        self.with(|s| s.compare = compare);
    }

    /// Make every call of the named method fail with a 500.
    pub fn fail(&self, method: &str) {
        self.with(|s| s.failing.insert(method.to_string()));
    }

    pub fn recover(&self, method: &str) {
        self.with(|s| s.failing.remove(method));
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    /// Request bodies sent to the named method, in order.
    pub fn bodies(&self, method: &str) -> Vec<Value> {
        self.with(|s| {
            s.bodies
                .iter()
                .filter(|(m, _)| m == method)
                .map(|(_, b)| b.clone())
                .collect()
        })
    }

    fn record(&self, method: &str, call: String, body: Option<Value>) -> Result<(), ApiError> {
        self.with(|s| {
            s.calls.push(call);
            if let Some(body) = body {
                s.bodies.push((method.to_string(), body));
            }
            if s.failing.contains(method) {
                Err(ApiError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    text: format!("{method} failed"),
                })
            } else {
                Ok(())
            }
        })
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.record("health", "health".to_string(), None)?;
        Ok(HealthResponse {
            status: "ok".to_string(),
            ..Default::default()
        })
    }

    async fn events(&self, query: &EventQuery) -> Result<ApiResponse<Vec<Event>>, ApiError> {
        self.record("events", format!("events offset={}", query.offset), None)?;
        Ok(self.with(|s| ApiResponse {
            success: true,
            message: String::new(),
            pagination: s.pagination.clone(),
            data: Some(s.events.clone()),
        }))
    }

    async fn label_values(&self, label: Label) -> Result<Vec<String>, ApiError> {
        self.record("label_values", format!("label_values {label}"), None)?;
        Ok(self.with(|s| s.labels.get(&label).cloned().unwrap_or_default()))
    }

    async fn data_keys(&self, service: Option<&str>) -> Result<Vec<String>, ApiError> {
        let call = format!("data_keys service={}", service.unwrap_or(""));
        self.record("data_keys", call, None)?;
        Ok(self.with(|s| s.data_keys.clone()))
    }

    async fn data_values(
        &self,
        key: &str,
        service: Option<&str>,
    ) -> Result<Vec<String>, ApiError> {
        let call = format!("data_values {} service={}", key, service.unwrap_or(""));
        self.record("data_values", call, None)?;
        Ok(self.with(|s| s.data_values.clone()))
    }

    async fn analytics(&self, query: &AnalyticsQuery) -> Result<AnalyticsResponse, ApiError> {
        let body = serde_json::to_value(query)?;
        self.record("analytics", "analytics".to_string(), Some(body))?;
        Ok(AnalyticsResponse::default())
    }

    async fn timeseries(&self, query: &TimeSeriesQuery) -> Result<TimeSeriesResponse, ApiError> {
        let body = serde_json::to_value(query)?;
        self.record("timeseries", "timeseries".to_string(), Some(body))?;
        Ok(self.with(|s| TimeSeriesResponse {
            series: s.series.clone(),
        }))
    }

    async fn topn(&self, query: &TopNQuery) -> Result<TopNResponse, ApiError> {
        let body = serde_json::to_value(query)?;
        self.record("topn", "topn".to_string(), Some(body))?;
        Ok(self.with(|s| TopNResponse {
            data: s.topn.clone(),
        }))
    }

    async fn gauge(&self, query: &GaugeQuery) -> Result<GaugeResponse, ApiError> {
        let body = serde_json::to_value(query)?;
        self.record("gauge", "gauge".to_string(), Some(body))?;
        Ok(self.with(|s| GaugeResponse { value: s.gauge }))
    }

    async fn compare(&self, query: &CompareQuery) -> Result<Option<CompareResponse>, ApiError> {
        let body = serde_json::to_value(query)?;
        self.record("compare", "compare".to_string(), Some(body))?;
        Ok(self.with(|s| s.compare.clone()))
    }
}

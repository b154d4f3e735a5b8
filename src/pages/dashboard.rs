// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! The dashboard builder: a collection of widgets, each fetched on its
//! own so that one slow or failing widget never holds up the others.

use std::path::Path;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use indexmap::IndexMap;

use crate::client::Backend;
use crate::filters::AnalyticsFilters;
use crate::prelude::*;
use crate::timerange::TimeRange;
use crate::types::*;
use crate::widget::{WidgetConfig, WidgetKind, DEFAULT_TOPN_LIMIT};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetData {
    Gauge(f64),
    Series(Vec<TimeSeriesSeries>),
    TopN(Vec<TopNDataPoint>),
    Compare(Option<CompareResponse>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<WidgetData>,
}

/// A widget request with the time window and filters resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetRequest {
    Gauge(GaugeQuery),
    TimeSeries(TimeSeriesQuery),
    TopN(TopNQuery),
    Compare(CompareQuery),
}

impl WidgetRequest {
    /// Build the request for a widget. Global filters come first, then
    /// the widget's own.
    pub fn new(
        widget: &WidgetConfig,
        range: TimeRange,
        global_filters: &[AnalyticsFilter],
        now: DateTime<Utc>,
    ) -> Self {
        let window = range.resolve(now);
        let filters: Vec<AnalyticsFilter> = global_filters
            .iter()
            .chain(widget.filters.iter())
            .cloned()
            .collect();
        let gauge = GaugeQuery {
            aggregation: widget.aggregation,
            field: widget.field.clone(),
            filters,
            from: window.from,
            to: window.to,
        };
        match &widget.kind {
            WidgetKind::Gauge { .. } => WidgetRequest::Gauge(gauge),
            WidgetKind::Compare { .. } => WidgetRequest::Compare(gauge),
            WidgetKind::TimeSeries {
                interval,
                group_by,
                fill_zeros,
                ..
            } => WidgetRequest::TimeSeries(TimeSeriesQuery {
                aggregation: gauge.aggregation,
                field: gauge.field,
                interval: interval.unwrap_or_else(|| range.interval()),
                group_by: group_by.clone(),
                filters: gauge.filters,
                from: gauge.from,
                to: gauge.to,
                fill_zeros: *fill_zeros,
            }),
            WidgetKind::TopN { group_by, limit } => WidgetRequest::TopN(TopNQuery {
                aggregation: gauge.aggregation,
                field: gauge.field,
                group_by: group_by.clone(),
                filters: gauge.filters,
                from: gauge.from,
                to: gauge.to,
                limit: if *limit == 0 { DEFAULT_TOPN_LIMIT } else { *limit },
            }),
        }
    }

    pub async fn execute<B: Backend + ?Sized>(&self, backend: &B) -> Result<WidgetData, ApiError> {
        let data = match self {
            WidgetRequest::Gauge(query) => WidgetData::Gauge(backend.gauge(query).await?.value),
            WidgetRequest::TimeSeries(query) => {
                WidgetData::Series(backend.timeseries(query).await?.series)
            }
            WidgetRequest::TopN(query) => WidgetData::TopN(backend.topn(query).await?.data),
            WidgetRequest::Compare(query) => WidgetData::Compare(backend.compare(query).await?),
        };
        Ok(data)
    }
}

/// A pending fetch for one widget.
#[derive(Debug, Clone)]
pub struct WidgetFetch {
    pub id: String,
    pub request: WidgetRequest,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    widgets: Vec<WidgetConfig>,
    states: IndexMap<String, WidgetState>,
    pub range: TimeRange,
    pub filters: AnalyticsFilters,
}

impl Dashboard {
    pub fn new(widgets: Vec<WidgetConfig>) -> Self {
        Self {
            widgets,
            ..Default::default()
        }
    }

    /// Load widget definitions from a YAML (or JSON) file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dashboard file {}", path.display()))?;
        let widgets: Vec<WidgetConfig> = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse dashboard file {}", path.display()))?;
        info!("Loaded {} widgets from {}", widgets.len(), path.display());
        Ok(Self::new(widgets))
    }

    /// Write the widget definitions back as YAML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create dashboard file {}", path.display()))?;
        serde_yaml::to_writer(file, &self.widgets)
            .with_context(|| format!("Failed to write dashboard file {}", path.display()))?;
        info!("Saved {} widgets to {}", self.widgets.len(), path.display());
        Ok(())
    }

    pub fn widgets(&self) -> &[WidgetConfig] {
        &self.widgets
    }

    pub fn widget(&self, id: &str) -> Option<&WidgetConfig> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// The fetch state of a widget. `None` until its first fetch starts.
    pub fn state(&self, id: &str) -> Option<&WidgetState> {
        self.states.get(id)
    }

    pub fn is_loading(&self) -> bool {
        self.states.values().any(|s| s.loading)
    }

    /// Add a widget and return the fetch for it.
    pub fn add(&mut self, widget: WidgetConfig) -> Option<WidgetFetch> {
        let id = widget.id.clone();
        self.widgets.push(widget);
        self.begin_fetch(&id, Utc::now())
    }

    /// Replace the widget with the same id.
    pub fn update(&mut self, widget: WidgetConfig) -> Option<WidgetFetch> {
        let id = widget.id.clone();
        let existing = self.widgets.iter_mut().find(|w| w.id == id)?;
        *existing = widget;
        self.begin_fetch(&id, Utc::now())
    }

    pub fn duplicate(&mut self, id: &str) -> Option<WidgetFetch> {
        let copy = self.widget(id)?.duplicate();
        self.add(copy)
    }

    /// Remove a widget along with its fetched data. Other widgets are
    /// untouched.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.id != id);
        self.states.shift_remove(id);
        self.widgets.len() != before
    }

    /// Mark a widget as loading and build its request. Previously fetched
    /// data is kept while loading.
    pub fn begin_fetch(&mut self, id: &str, now: DateTime<Utc>) -> Option<WidgetFetch> {
        let widget = self.widgets.iter().find(|w| w.id == id)?;
        let request = WidgetRequest::new(widget, self.range, self.filters.filters(), now);
        let state = self.states.entry(id.to_string()).or_default();
        state.loading = true;
        state.error = None;
        Some(WidgetFetch {
            id: id.to_string(),
            request,
        })
    }

    /// Apply the result of a fetch. Returns false if the widget was
    /// deleted in the meantime and the result dropped.
    pub fn finish(&mut self, id: &str, result: Result<WidgetData, ApiError>) -> bool {
        if self.widget(id).is_none() {
            debug!("Dropping result for deleted widget {}", id);
            return false;
        }
        let state = self.states.entry(id.to_string()).or_default();
        state.loading = false;
        match result {
            Ok(data) => {
                state.error = None;
                state.data = Some(data);
            }
            Err(err) => {
                warn!("Failed to fetch widget {}: {}", id, err);
                state.error = Some(err.to_string());
                state.data = None;
            }
        }
        true
    }

    pub async fn run<B: Backend + ?Sized>(&mut self, backend: &B, fetch: WidgetFetch) -> bool {
        let result = fetch.request.execute(backend).await;
        self.finish(&fetch.id, result)
    }

    pub async fn fetch_widget<B: Backend + ?Sized>(&mut self, backend: &B, id: &str) -> bool {
        match self.begin_fetch(id, Utc::now()) {
            Some(fetch) => self.run(backend, fetch).await,
            None => false,
        }
    }

    /// Fetch every widget concurrently. Each result is applied on its own.
    pub async fn refresh_all<B: Backend + ?Sized>(&mut self, backend: &B) {
        let now = Utc::now();
        let ids: Vec<String> = self.widgets.iter().map(|w| w.id.clone()).collect();
        let fetches: Vec<WidgetFetch> = ids
            .iter()
            .filter_map(|id| self.begin_fetch(id, now))
            .collect();
        let results = join_all(fetches.iter().map(|f| f.request.execute(backend))).await;
        for (fetch, result) in fetches.iter().zip(results) {
            self.finish(&fetch.id, result);
        }
    }
}

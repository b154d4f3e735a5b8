// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};

use crate::client::Backend;
use crate::filters::AnalyticsFilters;
use crate::prelude::*;
use crate::timerange::TimeRange;
use crate::types::*;

pub const TOP_LIMIT: u32 = 5;

/// Everything shown on the analytics overview, replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsData {
    pub events_series: Vec<TimeSeriesSeries>,
    pub errors_series: Vec<TimeSeriesSeries>,
    pub total_events: f64,
    pub total_errors: f64,
    pub events_compare: Option<CompareResponse>,
    pub errors_compare: Option<CompareResponse>,
    pub top_services: Vec<TopNDataPoint>,
    pub top_event_names: Vec<TopNDataPoint>,
}

fn with_errors(filters: &[AnalyticsFilter]) -> Vec<AnalyticsFilter> {
    let mut filters = filters.to_vec();
    filters.push(AnalyticsFilter::new("level", Operator::Eq, "error"));
    filters
}

/// Issue the eight overview requests together. Any failure fails the
/// whole batch.
pub async fn fetch_overview<B: Backend + ?Sized>(
    backend: &B,
    range: TimeRange,
    filters: &[AnalyticsFilter],
    now: DateTime<Utc>,
) -> Result<AnalyticsData, ApiError> {
    let window = range.resolve(now);
    let error_filters = with_errors(filters);

    let series = |filters: &[AnalyticsFilter]| TimeSeriesQuery {
        aggregation: Aggregation::Count,
        interval: range.interval(),
        filters: filters.to_vec(),
        from: window.from.clone(),
        to: window.to.clone(),
        fill_zeros: true,
        ..Default::default()
    };
    let gauge = |filters: &[AnalyticsFilter]| GaugeQuery {
        aggregation: Aggregation::Count,
        field: None,
        filters: filters.to_vec(),
        from: window.from.clone(),
        to: window.to.clone(),
    };
    let top = |group_by: &str| TopNQuery {
        aggregation: Aggregation::Count,
        field: None,
        group_by: group_by.to_string(),
        filters: filters.to_vec(),
        from: window.from.clone(),
        to: window.to.clone(),
        limit: TOP_LIMIT,
    };

    let events_query = series(filters);
    let errors_query = series(&error_filters);
    let total_query = gauge(filters);
    let total_errors_query = gauge(&error_filters);
    let services_query = top("service");
    let names_query = top("name");

    let (
        events_series,
        errors_series,
        total_events,
        total_errors,
        events_compare,
        errors_compare,
        top_services,
        top_event_names,
    ) = futures::try_join!(
        backend.timeseries(&events_query),
        backend.timeseries(&errors_query),
        backend.gauge(&total_query),
        backend.gauge(&total_errors_query),
        backend.compare(&total_query),
        backend.compare(&total_errors_query),
        backend.topn(&services_query),
        backend.topn(&names_query),
    )?;

    Ok(AnalyticsData {
        events_series: events_series.series,
        errors_series: errors_series.series,
        total_events: total_events.value,
        total_errors: total_errors.value,
        events_compare,
        errors_compare,
        top_services: top_services.data,
        top_event_names: top_event_names.data,
    })
}

#[derive(Debug, Default)]
pub struct AnalyticsPage {
    pub range: TimeRange,
    pub filters: AnalyticsFilters,
    data: AnalyticsData,
    loading: bool,
    error: Option<String>,
}

impl AnalyticsPage {
    pub fn new(range: TimeRange, filters: AnalyticsFilters) -> Self {
        Self {
            range,
            filters,
            ..Default::default()
        }
    }

    pub fn data(&self) -> &AnalyticsData {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn refresh<B: Backend + ?Sized>(&mut self, backend: &B) -> bool {
        self.refresh_at(backend, Utc::now()).await
    }

    /// Refresh relative to `now`. The displayed data is only replaced when
    /// every request succeeded.
    pub async fn refresh_at<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        now: DateTime<Utc>,
    ) -> bool {
        self.loading = true;
        self.error = None;
        let result = fetch_overview(backend, self.range, self.filters.filters(), now).await;
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = data;
                true
            }
            Err(err) => {
                warn!("Failed to fetch analytics: {}", err);
                self.error = Some(err.to_string());
                false
            }
        }
    }
}

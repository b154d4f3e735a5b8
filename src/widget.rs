// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Dashboard widget definitions and the editor draft that produces them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filters::FilterDraft;
use crate::types::{Aggregation, AnalyticsFilter, Interval};

pub const DEFAULT_TOPN_LIMIT: u32 = 10;

pub const DEFAULT_GROUP_BY: &str = "service";

/// Fields offered by the editor's field menu. An empty field means none,
/// which is only valid for a count.
pub const COMMON_FIELDS: [&str; 7] = ["service", "env", "name", "level", "user_id", "trace_id", "job_id"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WidgetError {
    #[error("aggregation {0} requires a field")]
    FieldRequired(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeVariant {
    #[default]
    Default,
    Error,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesDisplay {
    #[default]
    Chart,
    Table,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Blue,
    Red,
    Green,
    Amber,
}

impl Color {
    pub fn hex(&self) -> &'static str {
        match self {
            Color::Blue => "#3b82f6",
            Color::Red => "#ef4444",
            Color::Green => "#22c55e",
            Color::Amber => "#f59e0b",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_group_by() -> String {
    DEFAULT_GROUP_BY.to_string()
}

fn default_limit() -> u32 {
    DEFAULT_TOPN_LIMIT
}

/// The type specific part of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetKind {
    Gauge {
        #[serde(default)]
        variant: GaugeVariant,
    },
    TimeSeries {
        #[serde(default)]
        display: SeriesDisplay,
        /// Falls back to the interval of the selected time range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<Interval>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        group_by: Vec<String>,
        #[serde(default = "default_true")]
        fill_zeros: bool,
        #[serde(default)]
        color: Color,
    },
    TopN {
        #[serde(default = "default_group_by")]
        group_by: String,
        #[serde(default = "default_limit")]
        limit: u32,
    },
    Compare {
        #[serde(default, alias = "invertColors")]
        invert_colors: bool,
    },
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Gauge { .. } => "gauge",
            WidgetKind::TimeSeries { .. } => "timeseries",
            WidgetKind::TopN { .. } => "topn",
            WidgetKind::Compare { .. } => "compare",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub filters: Vec<AnalyticsFilter>,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

pub fn new_widget_id() -> String {
    format!("widget-{}", uuid::Uuid::new_v4())
}

impl WidgetConfig {
    /// A copy under a new id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_widget_id(),
            title: format!("{} (Copy)", self.title),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidgetType {
    #[default]
    Gauge,
    TimeSeries,
    TopN,
    Compare,
}

impl WidgetType {
    pub const ALL: [WidgetType; 4] = [
        WidgetType::Gauge,
        WidgetType::TimeSeries,
        WidgetType::TopN,
        WidgetType::Compare,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WidgetType::Gauge => "gauge",
            WidgetType::TimeSeries => "timeseries",
            WidgetType::TopN => "topn",
            WidgetType::Compare => "compare",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WidgetType::Gauge => "Single metric value",
            WidgetType::TimeSeries => "Line chart over time",
            WidgetType::TopN => "Ranked list of values",
            WidgetType::Compare => "Current vs previous period",
        }
    }
}

/// The state of the widget editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDraft {
    id: Option<String>,
    pub widget_type: WidgetType,
    pub title: String,
    pub aggregation: Aggregation,
    pub field: String,
    pub custom_field: String,
    pub filters: Vec<AnalyticsFilter>,
    pub new_filter: FilterDraft,
    pub interval: Interval,
    pub display: SeriesDisplay,
    pub group_by: String,
    pub custom_group_by: String,
    pub fill_zeros: bool,
    pub color: Color,
    pub variant: GaugeVariant,
    pub limit: u32,
    pub invert_colors: bool,
}

impl Default for WidgetDraft {
    fn default() -> Self {
        Self {
            id: None,
            widget_type: WidgetType::Gauge,
            title: String::new(),
            aggregation: Aggregation::Count,
            field: String::new(),
            custom_field: String::new(),
            filters: vec![],
            new_filter: FilterDraft::default(),
            interval: Interval::Hour,
            display: SeriesDisplay::Chart,
            group_by: DEFAULT_GROUP_BY.to_string(),
            custom_group_by: String::new(),
            fill_zeros: true,
            color: Color::Blue,
            variant: GaugeVariant::Default,
            limit: DEFAULT_TOPN_LIMIT,
            invert_colors: false,
        }
    }
}

impl WidgetDraft {
    pub fn new(widget_type: WidgetType) -> Self {
        Self {
            widget_type,
            ..Self::default()
        }
    }

    /// Prefill the form for editing an existing widget.
    pub fn from_widget(widget: &WidgetConfig) -> Self {
        let mut draft = Self {
            id: Some(widget.id.clone()),
            title: widget.title.clone(),
            aggregation: widget.aggregation,
            field: widget.field.clone().unwrap_or_default(),
            filters: widget.filters.clone(),
            ..Self::default()
        };
        match &widget.kind {
            WidgetKind::Gauge { variant } => {
                draft.widget_type = WidgetType::Gauge;
                draft.variant = *variant;
            }
            WidgetKind::TimeSeries {
                display,
                interval,
                group_by,
                fill_zeros,
                color,
            } => {
                draft.widget_type = WidgetType::TimeSeries;
                draft.display = *display;
                draft.interval = interval.unwrap_or_default();
                if let Some(group_by) = group_by.first() {
                    draft.group_by = group_by.clone();
                }
                draft.fill_zeros = *fill_zeros;
                draft.color = *color;
            }
            WidgetKind::TopN { group_by, limit } => {
                draft.widget_type = WidgetType::TopN;
                if !group_by.is_empty() {
                    draft.group_by = group_by.clone();
                }
                draft.limit = *limit;
            }
            WidgetKind::Compare { invert_colors } => {
                draft.widget_type = WidgetType::Compare;
                draft.invert_colors = *invert_colors;
            }
        }
        draft
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn needs_field(&self) -> bool {
        self.aggregation.needs_field()
    }

    /// Add the pending filter. Unlike the global filter bar every
    /// operator is offered here.
    pub fn add_filter(&mut self) -> bool {
        let value = self.new_filter.value.trim();
        if value.is_empty() {
            return false;
        }
        self.filters.push(AnalyticsFilter::new(
            &self.new_filter.field,
            self.new_filter.operator,
            value,
        ));
        self.new_filter.value.clear();
        true
    }

    pub fn remove_filter(&mut self, index: usize) {
        if index < self.filters.len() {
            self.filters.remove(index);
        }
    }

    fn resolved_field(&self) -> Option<String> {
        [&self.field, &self.custom_field]
            .into_iter()
            .map(|f| f.trim())
            .find(|f| !f.is_empty())
            .map(str::to_string)
    }

    fn resolved_group_by(&self) -> Option<String> {
        [&self.group_by, &self.custom_group_by]
            .into_iter()
            .map(|f| f.trim())
            .find(|f| !f.is_empty())
            .map(str::to_string)
    }

    pub fn build(&self) -> Result<WidgetConfig, WidgetError> {
        let field = self.resolved_field();
        if field.is_none() && self.needs_field() {
            return Err(WidgetError::FieldRequired(self.aggregation.label()));
        }
        let title = if self.title.trim().is_empty() {
            format!("{} widget", self.widget_type.name())
        } else {
            self.title.trim().to_string()
        };
        let kind = match self.widget_type {
            WidgetType::Gauge => WidgetKind::Gauge {
                variant: self.variant,
            },
            WidgetType::TimeSeries => WidgetKind::TimeSeries {
                display: self.display,
                interval: Some(self.interval),
                group_by: self.resolved_group_by().into_iter().collect(),
                fill_zeros: self.fill_zeros,
                color: self.color,
            },
            WidgetType::TopN => WidgetKind::TopN {
                group_by: self
                    .resolved_group_by()
                    .unwrap_or_else(|| DEFAULT_GROUP_BY.to_string()),
                limit: self.limit,
            },
            WidgetType::Compare => WidgetKind::Compare {
                invert_colors: self.invert_colors,
            },
        };
        Ok(WidgetConfig {
            id: self.id.clone().unwrap_or_else(new_widget_id),
            title,
            aggregation: self.aggregation,
            field,
            filters: self.filters.clone(),
            kind,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Operator;

    #[test]
    fn test_draft_defaults() {
        let widget = WidgetDraft::new(WidgetType::TopN).build().unwrap();
        assert!(widget.id.starts_with("widget-"));
        assert_eq!(widget.title, "topn widget");
        assert_eq!(widget.field, None);
        assert_eq!(
            widget.kind,
            WidgetKind::TopN {
                group_by: "service".to_string(),
                limit: 10
            }
        );

        let mut draft = WidgetDraft::new(WidgetType::TimeSeries);
        draft.group_by.clear();
        let widget = draft.build().unwrap();
        match widget.kind {
            WidgetKind::TimeSeries {
                group_by,
                fill_zeros,
                interval,
                ..
            } => {
                assert!(group_by.is_empty());
                assert!(fill_zeros);
                assert_eq!(interval, Some(Interval::Hour));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_field_required() {
        let mut draft = WidgetDraft::new(WidgetType::Gauge);
        draft.aggregation = Aggregation::P95;
        assert_eq!(draft.build(), Err(WidgetError::FieldRequired("P95")));

        draft.custom_field = "data.duration".to_string();
        assert_eq!(draft.build().unwrap().field.as_deref(), Some("data.duration"));

        // The menu selection wins over the custom field.
        draft.field = "user_id".to_string();
        assert_eq!(draft.build().unwrap().field.as_deref(), Some("user_id"));
    }

    #[test]
    fn test_edit_keeps_id() {
        let mut draft = WidgetDraft::new(WidgetType::Compare);
        draft.title = "Errors".to_string();
        draft.invert_colors = true;
        let widget = draft.build().unwrap();

        let mut draft = WidgetDraft::from_widget(&widget);
        assert!(draft.is_editing());
        assert!(draft.invert_colors);
        draft.title = "Errors vs last period".to_string();
        let edited = draft.build().unwrap();
        assert_eq!(edited.id, widget.id);
        assert_eq!(edited.title, "Errors vs last period");
    }

    #[test]
    fn test_draft_filters() {
        let mut draft = WidgetDraft::default();
        draft.new_filter = FilterDraft::new("data.duration", Operator::Gte, " 100 ");
        assert!(draft.add_filter());
        assert!(!draft.add_filter());
        assert_eq!(
            draft.filters,
            vec![AnalyticsFilter::new("data.duration", Operator::Gte, "100")]
        );
        // Field and operator stick for the next filter.
        assert_eq!(draft.new_filter.operator, Operator::Gte);
        draft.remove_filter(0);
        assert!(draft.filters.is_empty());
    }

    #[test]
    fn test_duplicate() {
        let widget = WidgetDraft::new(WidgetType::Gauge).build().unwrap();
        let copy = widget.duplicate();
        assert_ne!(copy.id, widget.id);
        assert_eq!(copy.title, "gauge widget (Copy)");
        assert_eq!(copy.kind, widget.kind);
    }

    #[test]
    fn test_deserialize() {
        let widgets: Vec<WidgetConfig> = serde_yaml::from_str(
            r#"
- id: errors
  title: Errors
  type: compare
  invertColors: true
- id: latency
  title: Latency
  type: timeseries
  aggregation: p95
  field: data.duration
  filters:
    - field: service
      operator: eq
      value: users
- id: top
  title: Top
  type: topn
"#,
        )
        .unwrap();
        assert_eq!(widgets[0].kind, WidgetKind::Compare { invert_colors: true });
        assert_eq!(widgets[1].aggregation, Aggregation::P95);
        match &widgets[1].kind {
            WidgetKind::TimeSeries {
                interval,
                fill_zeros,
                color,
                ..
            } => {
                assert_eq!(*interval, None);
                assert!(*fill_zeros);
                assert_eq!(*color, Color::Blue);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            widgets[2].kind,
            WidgetKind::TopN {
                group_by: "service".to_string(),
                limit: 10
            }
        );
    }
}

// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Cards, lists and tables for analytics results and dashboard widgets.

use super::chart::sparkline;
use super::{fit, format_compact, format_precise, format_timestamp, Style, Tone};
use crate::pages::{AnalyticsData, WidgetData, WidgetState};
use crate::types::{CompareResponse, TimeSeriesSeries, TopNDataPoint};
use crate::widget::{Color, GaugeVariant, SeriesDisplay, WidgetConfig, WidgetKind};

const NO_DATA: &str = "No data available";

const BAR_WIDTH: usize = 20;

fn variant_tone(variant: GaugeVariant) -> Tone {
    match variant {
        GaugeVariant::Default => Tone::Plain,
        GaugeVariant::Error => Tone::Red,
        GaugeVariant::Success => Tone::Green,
        GaugeVariant::Warning => Tone::Amber,
    }
}

fn color_tone(color: Color) -> Tone {
    match color {
        Color::Blue => Tone::Blue,
        Color::Red => Tone::Red,
        Color::Green => Tone::Green,
        Color::Amber => Tone::Amber,
    }
}

fn title_line(title: &str, style: Style) -> String {
    format!("{}\n", style.bold(title))
}

pub fn gauge(title: &str, value: f64, variant: GaugeVariant, style: Style) -> String {
    format!(
        "{}{}\n",
        title_line(title, style),
        style.paint(&format_compact(value), variant_tone(variant))
    )
}

/// Current value, change against the previous period and the previous
/// value. With `invert_colors` a decrease is shown as the good outcome.
pub fn compare(title: &str, data: Option<&CompareResponse>, invert_colors: bool, style: Style) -> String {
    let (current, previous, change_percent) = match data {
        Some(data) => (data.current, data.previous, data.change_percent),
        None => (0.0, 0.0, 0.0),
    };
    let increase = change_percent > 0.0;
    let good = if invert_colors { !increase } else { increase };
    let (arrow, tone) = if change_percent == 0.0 {
        ("", Tone::Muted)
    } else if good {
        (if increase { "↑ " } else { "↓ " }, Tone::Green)
    } else {
        (if increase { "↑ " } else { "↓ " }, Tone::Red)
    };
    let change = format!("{}{:.1}%", arrow, change_percent.abs());
    format!(
        "{}{}  {}\n{}\n",
        title_line(title, style),
        format_compact(current),
        style.paint(&change, tone),
        style.paint(&format!("Previous: {}", format_compact(previous)), Tone::Muted)
    )
}

/// Ranked list with a bar scaled against the largest value.
pub fn topn(title: &str, data: &[TopNDataPoint], style: Style) -> String {
    let mut out = title_line(title, style);
    if data.is_empty() {
        out.push_str(&style.paint(NO_DATA, Tone::Muted));
        out.push('\n');
        return out;
    }
    let max = data.iter().map(|d| d.value).fold(f64::MIN, f64::max);
    let key_width = data
        .iter()
        .map(|d| d.key.chars().count().max(7))
        .max()
        .unwrap_or(7)
        .min(32);
    for (i, item) in data.iter().enumerate() {
        let key = if item.key.is_empty() { "(empty)" } else { &item.key };
        let filled = if max > 0.0 {
            ((item.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = format!(
            "{}{}",
            "█".repeat(filled.min(BAR_WIDTH)),
            "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
        );
        out.push_str(&format!(
            "{:>2}. {}  {}  {}\n",
            i + 1,
            fit(key, key_width),
            style.paint(&bar, Tone::Blue),
            format_compact(item.value)
        ));
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SeriesStats {
    total: f64,
    avg: f64,
    min: f64,
    max: f64,
}

fn series_stats(series: &TimeSeriesSeries) -> SeriesStats {
    let values: Vec<f64> = series.data_points.iter().map(|p| p.value).collect();
    if values.is_empty() {
        return SeriesStats {
            total: 0.0,
            avg: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }
    let total: f64 = values.iter().sum();
    SeriesStats {
        total,
        avg: total / values.len() as f64,
        min: values.iter().copied().fold(f64::MAX, f64::min),
        max: values.iter().copied().fold(f64::MIN, f64::max),
    }
}

fn has_data(series: &[TimeSeriesSeries]) -> bool {
    series.first().is_some_and(|s| !s.data_points.is_empty())
}

/// A single series is listed point by point; several series are
/// summarized one row each.
pub fn timeseries_table(title: &str, series: &[TimeSeriesSeries], style: Style) -> String {
    let mut out = title_line(title, style);
    if !has_data(series) {
        out.push_str(&style.paint(NO_DATA, Tone::Muted));
        out.push('\n');
        return out;
    }

    if series.len() > 1 {
        out.push_str(&style.bold(&format!(
            "{}  {:>11}  {:>10}  {:>10}  {:>10}  {:>10}",
            fit("Series", 20),
            "Data Points",
            "Total",
            "Avg",
            "Min",
            "Max"
        )));
        out.push('\n');
        for s in series {
            let stats = series_stats(s);
            out.push_str(&format!(
                "{}  {:>11}  {:>10}  {:>10}  {:>10}  {:>10}\n",
                fit(s.name.as_deref().unwrap_or("(default)"), 20),
                s.data_points.len(),
                format_precise(stats.total),
                format_precise(stats.avg),
                format_precise(stats.min),
                format_precise(stats.max)
            ));
        }
        out.push_str(&style.paint(&format!("{} series", series.len()), Tone::Muted));
    } else {
        out.push_str(&style.bold(&format!("{}  {:>10}", fit("Timestamp", 19), "Value")));
        out.push('\n');
        for point in &series[0].data_points {
            out.push_str(&format!(
                "{}  {:>10}\n",
                fit(&format_timestamp(&point.timestamp), 19),
                format_precise(point.value)
            ));
        }
        out.push_str(&style.paint(
            &format!("{} data points", series[0].data_points.len()),
            Tone::Muted,
        ));
    }
    out.push('\n');
    out
}

/// The terminal stand-in for the line chart: a sparkline of the first
/// series with its range.
pub fn timeseries_chart(title: &str, series: &[TimeSeriesSeries], color: Color, style: Style) -> String {
    let mut out = title_line(title, style);
    if !has_data(series) {
        out.push_str(&style.paint(NO_DATA, Tone::Muted));
        out.push('\n');
        return out;
    }
    let values: Vec<f64> = series[0].data_points.iter().map(|p| p.value).collect();
    let stats = series_stats(&series[0]);
    out.push_str(&style.paint(&sparkline(&values), color_tone(color)));
    out.push('\n');
    out.push_str(&style.paint(
        &format!(
            "min {}  max {}  total {}",
            format_compact(stats.min),
            format_compact(stats.max),
            format_compact(stats.total)
        ),
        Tone::Muted,
    ));
    out.push('\n');
    out
}

/// Render a dashboard widget from its fetch state. A widget that has not
/// started fetching is shown as loading.
pub fn widget(widget: &WidgetConfig, state: Option<&WidgetState>, style: Style) -> String {
    let loading = state.map_or(true, |s| s.loading);
    if let Some(err) = state.and_then(|s| s.error.as_deref()) {
        return format!("{}{}\n", title_line(&widget.title, style), style.paint(err, Tone::Red));
    }
    let data = state.and_then(|s| s.data.as_ref());
    if loading && data.is_none() {
        return format!(
            "{}{}\n",
            title_line(&widget.title, style),
            style.paint("Loading...", Tone::Muted)
        );
    }
    match &widget.kind {
        WidgetKind::Gauge { variant } => {
            let value = match data {
                Some(WidgetData::Gauge(value)) => *value,
                _ => 0.0,
            };
            gauge(&widget.title, value, *variant, style)
        }
        WidgetKind::TimeSeries { display, color, .. } => {
            let series: &[TimeSeriesSeries] = match data {
                Some(WidgetData::Series(series)) => series.as_slice(),
                _ => &[],
            };
            match display {
                SeriesDisplay::Table => timeseries_table(&widget.title, series, style),
                SeriesDisplay::Chart => timeseries_chart(&widget.title, series, *color, style),
            }
        }
        WidgetKind::TopN { .. } => {
            let items: &[TopNDataPoint] = match data {
                Some(WidgetData::TopN(items)) => items.as_slice(),
                _ => &[],
            };
            topn(&widget.title, items, style)
        }
        WidgetKind::Compare { invert_colors } => {
            let compare_data = match data {
                Some(WidgetData::Compare(data)) => data.as_ref(),
                _ => None,
            };
            compare(&widget.title, compare_data, *invert_colors, style)
        }
    }
}

pub fn analytics_overview(data: &AnalyticsData, style: Style) -> String {
    [
        gauge("Total Events", data.total_events, GaugeVariant::Default, style),
        gauge("Total Errors", data.total_errors, GaugeVariant::Error, style),
        compare("Events vs Previous", data.events_compare.as_ref(), false, style),
        compare("Errors vs Previous", data.errors_compare.as_ref(), true, style),
        timeseries_chart("Events Over Time", &data.events_series, Color::Blue, style),
        timeseries_chart("Errors Over Time", &data.errors_series, Color::Red, style),
        topn("Top Services", &data.top_services, style),
        topn("Top Events", &data.top_event_names, style),
    ]
    .join("\n")
}

// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Line chart geometry for a time series, as SVG path data in a
//! `0 0 100 <height>` view box, plus a terminal sparkline.

use crate::types::TimeSeriesSeries;
use crate::widget::Color;

pub const DEFAULT_HEIGHT: f64 = 200.0;

const PAD_TOP: f64 = 20.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_BOTTOM: f64 = 30.0;
const PAD_LEFT: f64 = 50.0;
const WIDTH: f64 = 100.0;
const LABEL_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub value: f64,
    pub y: f64,
}

impl AxisLabel {
    pub fn text(&self) -> String {
        if self.value >= 1000.0 {
            format!("{:.1}k", self.value / 1000.0)
        } else {
            format!("{}", self.value)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartGeometry {
    pub path: String,
    pub area_path: String,
    pub points: Vec<ChartPoint>,
    pub max_value: f64,
    pub min_value: f64,
    pub labels: Vec<AxisLabel>,
}

impl ChartGeometry {
    /// Lay out the first series. The value axis always includes 0 and 1.
    pub fn new(series: &[TimeSeriesSeries], height: f64) -> Self {
        let data_points = match series.first() {
            Some(s) if !s.data_points.is_empty() => &s.data_points,
            _ => return Self::default(),
        };

        let max_value = data_points.iter().map(|p| p.value).fold(1.0, f64::max);
        let min_value = data_points.iter().map(|p| p.value).fold(0.0, f64::min);
        let range = if max_value - min_value == 0.0 {
            1.0
        } else {
            max_value - min_value
        };
        let chart_height = height - PAD_TOP - PAD_BOTTOM;
        let steps = if data_points.len() > 1 {
            (data_points.len() - 1) as f64
        } else {
            1.0
        };

        let points: Vec<ChartPoint> = data_points
            .iter()
            .enumerate()
            .map(|(i, point)| ChartPoint {
                x: PAD_LEFT + (i as f64 / steps) * (WIDTH - PAD_LEFT - PAD_RIGHT),
                y: PAD_TOP + chart_height - ((point.value - min_value) / range) * chart_height,
                value: point.value,
                timestamp: point.timestamp.clone(),
            })
            .collect();

        let path = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let cmd = if i == 0 { "M" } else { "L" };
                format!("{} {} {}", cmd, p.x, p.y)
            })
            .collect::<Vec<String>>()
            .join(" ");

        let bottom = PAD_TOP + chart_height;
        let area_path = match (points.first(), points.last()) {
            (Some(first), Some(last)) => {
                format!("{} L {} {} L {} {} Z", path, last.x, bottom, first.x, bottom)
            }
            _ => String::new(),
        };

        let last = (LABEL_COUNT - 1) as f64;
        let labels = (0..LABEL_COUNT)
            .map(|i| AxisLabel {
                value: (min_value + range * (last - i as f64) / last).round(),
                y: PAD_TOP + (i as f64 / last) * chart_height,
            })
            .collect();

        Self {
            path,
            area_path,
            points,
            max_value,
            min_value,
            labels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A standalone SVG document.
    pub fn to_svg(&self, title: &str, color: Color, height: f64) -> String {
        let stroke = color.hex();
        let gradient_id = format!(
            "gradient-{:?}-{}",
            color,
            title.split_whitespace().collect::<String>()
        )
        .to_lowercase();
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 {height}" preserveAspectRatio="none">"#
        );
        svg.push_str(&format!(
            r#"<defs><linearGradient id="{gradient_id}" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="{stroke}" stop-opacity="0.3"/><stop offset="100%" stop-color="{stroke}" stop-opacity="0"/></linearGradient></defs>"#
        ));
        for label in &self.labels {
            svg.push_str(&format!(
                r#"<line x1="50" y1="{y}" x2="100" y2="{y}" stroke="currentColor" stroke-width="0.1"/>"#,
                y = label.y
            ));
            svg.push_str(&format!(
                r#"<text x="48" y="{}" text-anchor="end" font-size="3">{}</text>"#,
                label.y + 1.0,
                label.text()
            ));
        }
        svg.push_str(&format!(
            r#"<path d="{}" fill="url(#{gradient_id})"/>"#,
            self.area_path
        ));
        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{stroke}" stroke-width="0.5" stroke-linecap="round" stroke-linejoin="round"/>"#,
            self.path
        ));
        for point in &self.points {
            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="0.8" fill="{stroke}"><title>{}: {}</title></circle>"#,
                point.x, point.y, point.timestamp, point.value
            ));
        }
        svg.push_str("</svg>");
        svg
    }
}

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One block character per value, scaled between the smallest and largest.
pub fn sparkline(values: &[f64]) -> String {
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            if range <= 0.0 {
                BLOCKS[0]
            } else {
                let index = ((v - min) / range * (BLOCKS.len() - 1) as f64).round() as usize;
                BLOCKS[index.min(BLOCKS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::DataPoint;

    fn series(values: &[f64]) -> Vec<TimeSeriesSeries> {
        vec![TimeSeriesSeries {
            name: None,
            data_points: values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint {
                    timestamp: format!("t{i}"),
                    value: *v,
                })
                .collect(),
        }]
    }

    #[test]
    fn test_geometry() {
        let chart = ChartGeometry::new(&series(&[0.0, 10.0, 5.0]), DEFAULT_HEIGHT);
        assert_eq!(chart.max_value, 10.0);
        assert_eq!(chart.min_value, 0.0);
        assert_eq!(chart.points[0].x, 50.0);
        assert_eq!(chart.points[2].x, 80.0);
        assert_eq!(chart.points[0].y, 170.0);
        assert_eq!(chart.points[1].y, 20.0);
        assert_eq!(chart.path, "M 50 170 L 65 20 L 80 95");
        assert_eq!(chart.area_path, "M 50 170 L 65 20 L 80 95 L 80 170 L 50 170 Z");
        let values: Vec<f64> = chart.labels.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![10.0, 8.0, 5.0, 3.0, 0.0]);
        assert_eq!(chart.labels[4].y, 170.0);
    }

    #[test]
    fn test_geometry_edge_cases() {
        assert!(ChartGeometry::new(&[], DEFAULT_HEIGHT).is_empty());
        assert!(ChartGeometry::new(&series(&[]), DEFAULT_HEIGHT).is_empty());

        // A single zero point still gets a unit axis.
        let chart = ChartGeometry::new(&series(&[0.0]), DEFAULT_HEIGHT);
        assert_eq!(chart.max_value, 1.0);
        assert_eq!(chart.points[0].x, 50.0);
        assert!(chart.area_path.ends_with('Z'));
    }

    #[test]
    fn test_axis_label_text() {
        assert_eq!(AxisLabel { value: 1500.0, y: 0.0 }.text(), "1.5k");
        assert_eq!(AxisLabel { value: 15.0, y: 0.0 }.text(), "15");
    }

    #[test]
    fn test_svg() {
        let chart = ChartGeometry::new(&series(&[1.0, 2.0]), DEFAULT_HEIGHT);
        let svg = chart.to_svg("Events Over Time", Color::Red, DEFAULT_HEIGHT);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("#ef4444"));
        assert!(svg.contains(r#"id="gradient-red-eventsovertime""#));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline(&[0.0, 7.0, 14.0]), "▁▅█");
        assert_eq!(sparkline(&[3.0, 3.0]), "▁▁");
        assert_eq!(sparkline(&[]), "");
    }
}

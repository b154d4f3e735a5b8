// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use super::analytics_filters;
use super::prelude::*;
use crate::pages::{AnalyticsData, AnalyticsPage};
use crate::render::chart::{ChartGeometry, DEFAULT_HEIGHT};
use crate::render::widgets::analytics_overview;
use crate::render::{filter_text, Tone};
use crate::timerange::TimeRange;
use crate::widget::Color;

#[derive(Debug, Parser)]
pub struct Args {
    /// Time range: 1h, 6h, 24h, 7d or 30d
    #[arg(short, long, default_value = "24h")]
    range: TimeRange,

    /// Filter, eg. --filter service = users
    #[arg(long = "filter", num_args = 3, value_names = ["FIELD", "OP", "VALUE"])]
    filters: Vec<String>,

    /// Also write the event and error charts as SVG into DIR
    #[arg(long, value_name = "DIR")]
    svg: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

fn write_charts(data: &AnalyticsData, dir: &Path) -> Result<()> {
    let charts = [
        ("events", "Events Over Time", &data.events_series, Color::Blue),
        ("errors", "Errors Over Time", &data.errors_series, Color::Red),
    ];
    for (name, title, series, color) in charts {
        let chart = ChartGeometry::new(series, DEFAULT_HEIGHT);
        if chart.is_empty() {
            debug!("No data for {} chart", name);
            continue;
        }
        let path = dir.join(format!("{name}.svg"));
        std::fs::write(&path, chart.to_svg(title, color, DEFAULT_HEIGHT))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

pub async fn main(args: Args, client: &Client) -> Result<()> {
    let mut page = AnalyticsPage::new(args.range, analytics_filters(&args.filters)?);
    if !page.refresh(client).await {
        bail!(page.error().unwrap_or("failed to fetch analytics").to_string());
    }

    if let Some(dir) = &args.svg {
        write_charts(page.data(), dir)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(page.data())?);
        return Ok(());
    }

    let style = Style::detect();
    let mut header = page.range.label().to_string();
    for filter in page.filters.filters() {
        header.push_str("  ");
        header.push_str(&filter_text(filter));
    }
    println!("{}\n", style.paint(&header, Tone::Muted));
    print!("{}", analytics_overview(page.data(), style));
    Ok(())
}

// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Duration;

use super::analytics_filters;
use super::prelude::*;
use crate::pages::Dashboard;
use crate::render::widgets;
use crate::timerange::TimeRange;

#[derive(Debug, Parser)]
pub struct Args {
    /// Dashboard file, a YAML list of widgets
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Time range: 1h, 6h, 24h, 7d or 30d
    #[arg(short, long, default_value = "24h")]
    range: TimeRange,

    /// Filter applied to every widget, eg. --filter service = users
    #[arg(long = "filter", num_args = 3, value_names = ["FIELD", "OP", "VALUE"])]
    filters: Vec<String>,

    /// Refresh at this interval (eg. 30s, 5m) until interrupted
    #[arg(short, long, value_parser = humantime::parse_duration)]
    watch: Option<Duration>,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Add, change or remove widgets interactively, then save the file
    #[arg(short, long, conflicts_with_all = ["watch", "json"])]
    edit: bool,
}

fn to_json(dashboard: &Dashboard) -> serde_json::Value {
    let widgets: Vec<serde_json::Value> = dashboard
        .widgets()
        .iter()
        .map(|widget| {
            let state = dashboard.state(&widget.id);
            json!({
                "id": widget.id,
                "title": widget.title,
                "data": state.and_then(|s| s.data.as_ref()),
                "error": state.and_then(|s| s.error.as_deref()),
            })
        })
        .collect();
    serde_json::Value::Array(widgets)
}

pub(super) fn print(dashboard: &Dashboard, style: Style) {
    for widget in dashboard.widgets() {
        println!("{}", widgets::widget(widget, dashboard.state(&widget.id), style));
    }
}

pub async fn main(args: Args, client: &Client) -> Result<()> {
    let mut dashboard = if args.edit && !args.file.exists() {
        info!("Creating new dashboard {}", args.file.display());
        Dashboard::default()
    } else {
        Dashboard::load(&args.file)?
    };
    dashboard.range = args.range;
    dashboard.filters = analytics_filters(&args.filters)?;
    let style = Style::detect();

    if args.edit {
        return super::editor::main(&mut dashboard, &args.file, client, style).await;
    }

    loop {
        dashboard.refresh_all(client).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&to_json(&dashboard))?);
        } else {
            print(&dashboard, style);
        }

        let Some(interval) = args.watch else {
            break;
        };
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping dashboard refresh");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::MockBackend;
    use crate::widget::{WidgetDraft, WidgetType};

    #[tokio::test]
    async fn test_to_json() {
        let backend = MockBackend::default();
        backend.set_gauge(42.0);
        let gauge = WidgetDraft::new(WidgetType::Gauge).build().unwrap();
        let topn = WidgetDraft::new(WidgetType::TopN).build().unwrap();
        let mut dashboard = Dashboard::new(vec![gauge.clone(), topn]);
        backend.fail("topn");
        dashboard.refresh_all(&backend).await;

        let value = to_json(&dashboard);
        assert_eq!(value[0]["id"], gauge.id.as_str());
        assert_eq!(value[0]["data"], 42.0);
        assert!(value[0]["error"].is_null());
        assert!(value[1]["data"].is_null());
        assert!(value[1]["error"].as_str().unwrap().starts_with("API error: 500"));
    }

    #[test]
    fn test_edit_conflicts() {
        assert!(Args::try_parse_from(["dashboard", "--file", "d.yaml", "--edit"]).is_ok());
        assert!(Args::try_parse_from(["dashboard", "--file", "d.yaml", "--edit", "--json"]).is_err());
        assert!(
            Args::try_parse_from(["dashboard", "--file", "d.yaml", "-e", "--watch", "30s"]).is_err()
        );
    }
}

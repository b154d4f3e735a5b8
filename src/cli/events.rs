// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::prelude::*;
use crate::filters::{EventQuery, DEFAULT_LIMIT};
use crate::pages::EventsPage;
use crate::query::{parse_input, QueryChip};
use crate::render::events::{event_detail, event_table};
use crate::render::Tone;

#[derive(Debug, Parser)]
pub struct Args {
    /// Filter expression, eg. "service = users" or "name contains login"
    #[arg(short, long = "filter", value_name = "EXPR")]
    filters: Vec<String>,

    /// Only events of this level
    #[arg(short, long)]
    level: Option<String>,

    /// Start timestamp (ISO-8601)
    #[arg(long)]
    from: Option<String>,

    /// End timestamp (ISO-8601)
    #[arg(long)]
    to: Option<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,

    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Print every field of each event
    #[arg(long)]
    detail: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

/// Each expression becomes a chip, as if typed into the query input.
pub(crate) fn chips_from_expressions(expressions: &[String]) -> Result<Vec<QueryChip>> {
    let mut chips: Vec<QueryChip> = vec![];
    for text in expressions {
        let expr = match parse_input(text) {
            Some(expr) if !expr.value.is_empty() => expr,
            _ => bail!("invalid filter expression: {}", text),
        };
        if chips.iter().any(|c| c.key == expr.key) {
            bail!("more than one filter on {}", expr.key);
        }
        chips.push(expr.into());
    }
    Ok(chips)
}

fn build_query(args: &Args) -> Result<EventQuery> {
    let query = EventQuery {
        level: args.level.clone(),
        from: args.from.clone(),
        to: args.to.clone(),
        limit: args.limit,
        offset: args.offset,
        ..Default::default()
    };
    Ok(query.with_chips(&chips_from_expressions(&args.filters)?))
}

pub(crate) fn print_page(page: &EventsPage, detail: bool, style: Style) {
    if detail {
        for event in page.events() {
            println!("{}", event_detail(event));
        }
    } else {
        print!("{}", event_table(page.events(), style));
    }
    println!("{}", style.paint(&page.summary(), Tone::Muted));
}

pub async fn main(args: Args, client: &Client) -> Result<()> {
    let mut page = EventsPage::new(build_query(&args)?);
    if !page.refresh(client).await {
        bail!(page.error().unwrap_or("failed to fetch events").to_string());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(page.events())?);
        return Ok(());
    }

    let style = Style::detect();
    print_page(&page, args.detail, style);
    if page.pagination().is_some_and(|p| p.has_next()) {
        let query = page.filters.query();
        info!("More events available with --offset {}", query.offset + query.limit);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Operator;

    #[test]
    fn test_build_query() {
        let args = Args::try_parse_from([
            "events",
            "-f",
            "service = users",
            "-f",
            "data.duration >= 100",
            "--level",
            "error",
            "--limit",
            "25",
        ])
        .unwrap();
        let query = build_query(&args).unwrap();
        assert_eq!(query.level.as_deref(), Some("error"));
        assert_eq!(query.limit, 25);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1].field, "data.duration");
        assert_eq!(query.filters[1].operator, Operator::Gte);
        assert!(query
            .to_params()
            .contains(&("data.duration__gte".to_string(), "100".to_string())));
    }

    #[test]
    fn test_bad_expressions() {
        let bad = |exprs: &[&str]| {
            chips_from_expressions(&exprs.iter().map(|e| e.to_string()).collect::<Vec<_>>())
                .is_err()
        };
        assert!(bad(&["service"]));
        assert!(bad(&["service = "]));
        assert!(bad(&["service = a", "service != b"]));
        assert!(!bad(&["service = a", "env = prod"]));
    }
}

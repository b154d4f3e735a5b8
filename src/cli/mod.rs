// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use crate::config::Config;
use crate::filters::AnalyticsFilters;
use crate::types::Operator;
use prelude::*;

pub mod analytics;
pub mod dashboard;
mod editor;
pub mod events;
pub mod health;
pub mod labels;
pub mod search;

pub(crate) mod prelude;

#[derive(Parser, Debug)]
#[command(name = "eventmon", version = crate::version::VERSION, about = "Events and analytics console")]
pub struct Args {
    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub api: ApiOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Default, clap::Args)]
pub struct ApiOptions {
    /// Configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Events API URL
    #[arg(long, global = true, value_name = "URL", env = "EVENTMON_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Events API key
    #[arg(long, global = true, value_name = "KEY", env = "EVENTMON_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl ApiOptions {
    pub fn client(&self) -> Result<Client> {
        let config = Config::load(self.config.as_deref())?;
        config.client(self.api_url.as_deref(), self.api_key.as_deref())
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the backend health
    Health(health::Args),
    /// List events
    Events(events::Args),
    /// List the known values of a label
    Labels(labels::Args),
    /// Show the analytics overview
    Analytics(analytics::Args),
    /// Fetch and show the widgets of a dashboard file, or edit it
    Dashboard(dashboard::Args),
    /// Build an event query interactively
    Search(search::Args),
}

pub async fn main(args: Args) -> Result<()> {
    crate::version::log_version();
    let client = args.api.client()?;
    match args.command {
        Commands::Health(args) => health::main(args, &client).await,
        Commands::Events(args) => events::main(args, &client).await,
        Commands::Labels(args) => labels::main(args, &client).await,
        Commands::Analytics(args) => analytics::main(args, &client).await,
        Commands::Dashboard(args) => dashboard::main(args, &client).await,
        Commands::Search(args) => search::main(args, client).await,
    }
}

/// Accepts an operator by name (`contains`) or symbol (`!=`).
pub(crate) fn parse_operator(s: &str) -> Result<Operator> {
    Operator::from_name(s)
        .or_else(|| Operator::from_symbol(s))
        .ok_or_else(|| anyhow!("unknown operator: {}", s))
}

/// Build analytics filters from repeated `--filter FIELD OP VALUE`
/// triples.
pub(crate) fn analytics_filters(values: &[String]) -> Result<AnalyticsFilters> {
    let mut filters = AnalyticsFilters::default();
    for triple in values.chunks(3) {
        let [field, op, value] = triple else {
            bail!("--filter takes FIELD OP VALUE");
        };
        let operator = parse_operator(op)?;
        if !filters.set_operator(operator) {
            bail!("operator {} can not be used in analytics filters", op);
        }
        filters.draft.field = field.clone();
        filters.draft.value = value.clone();
        if !filters.add() {
            bail!("filter on {} has no value", field);
        }
    }
    Ok(filters)
}

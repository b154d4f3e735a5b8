// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::prelude::*;
use crate::types::Label;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(value_enum)]
    label: Label,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub async fn main(args: Args, client: &Client) -> Result<()> {
    let values = client.label_values(args.label).await?;
    debug!("Fetched {} values for {}", values.len(), args.label);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for value in &values {
            println!("{}", value);
        }
    }
    Ok(())
}

// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::prelude::*;
use crate::pages::health::POLL_INTERVAL;
use crate::pages::{HealthMonitor, HealthStatus};
use crate::render::health_badge;

#[derive(Debug, Parser)]
pub struct Args {
    /// Keep polling until interrupted
    #[arg(short, long)]
    watch: bool,
}

pub async fn main(args: Args, client: &Client) -> Result<()> {
    let style = Style::detect();
    let mut monitor = HealthMonitor::default();

    if !args.watch {
        let status = monitor.poll(client).await;
        println!("{}", health_badge(status, style));
        if let HealthStatus::Offline(err) = status {
            bail!("{} is offline: {}", client.url(), err);
        }
        return Ok(());
    }

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let status = monitor.poll(client).await;
                println!("{}", health_badge(status, style));
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping health poll");
                break;
            }
        }
    }
    Ok(())
}

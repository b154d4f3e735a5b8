// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Terminal renderers for events and analytics results.
//!
//! Renderers are pure: they take fetched data and return the text to
//! print, coloured only when the [`Style`] allows it.

use std::io::IsTerminal;

use owo_colors::OwoColorize;

use crate::pages::HealthStatus;
use crate::types::AnalyticsFilter;

pub mod chart;
pub mod events;
pub mod widgets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Muted,
    Blue,
    Red,
    Green,
    Amber,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub const PLAIN: Style = Style { color: false };

    /// Colour when stdout is a terminal.
    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Plain => text.to_string(),
            Tone::Muted => text.dimmed().to_string(),
            Tone::Blue => text.blue().to_string(),
            Tone::Red => text.red().to_string(),
            Tone::Green => text.green().to_string(),
            Tone::Amber => text.yellow().to_string(),
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// A plain number, without trailing zeros and with at most three
/// decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let text = format!("{:.3}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn format_scaled(value: f64, precision: usize) -> String {
    if value >= 1_000_000.0 {
        format!("{:.*}M", precision, value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.*}K", precision, value / 1_000.0)
    } else {
        format_number(value)
    }
}

/// Compact form for cards and lists: `1.5K`, `2.0M`.
pub fn format_compact(value: f64) -> String {
    format_scaled(value, 1)
}

/// Compact form with two decimals, used in tables.
pub fn format_precise(value: f64) -> String {
    format_scaled(value, 2)
}

/// Format an ISO timestamp in local time, or return it unchanged if it
/// does not parse.
pub fn format_timestamp(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Pad or truncate to a display width in characters.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}

/// An analytics filter as the structured editors show it.
pub fn filter_text(filter: &AnalyticsFilter) -> String {
    format!("{} {} {}", filter.field, filter.operator.label(), filter.value)
}

pub fn health_badge(status: &HealthStatus, style: Style) -> String {
    match status {
        HealthStatus::Connecting => style.paint("● Connecting...", Tone::Muted),
        HealthStatus::Offline(err) => {
            format!("{} ({})", style.paint("● Offline", Tone::Red), err)
        }
        HealthStatus::Online(health) => {
            let mut out = format!(
                "{}  Q: {}  P: {}",
                style.paint("● Online", Tone::Green),
                health.enqueued,
                health.pending
            );
            if health.dropped > 0 {
                out.push_str(&format!("  D: {}", style.paint(&health.dropped.to_string(), Tone::Red)));
            }
            out
        }
    }
}

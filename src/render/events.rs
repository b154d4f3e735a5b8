// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::{fit, format_timestamp, Style, Tone};
use crate::types::Event;

fn level_tone(level: &str) -> Tone {
    match level.to_lowercase().as_str() {
        "error" => Tone::Red,
        "warn" | "warning" => Tone::Amber,
        "debug" => Tone::Muted,
        _ => Tone::Blue,
    }
}

/// Long identifiers are cut to their first 12 characters.
fn short_id(id: Option<&str>) -> String {
    match id {
        Some(id) if !id.is_empty() => {
            let short: String = id.chars().take(12).collect();
            format!("{short}...")
        }
        _ => "-".to_string(),
    }
}

const COLUMNS: [(&str, usize); 6] = [
    ("Timestamp", 19),
    ("Service", 14),
    ("Name", 24),
    ("Level", 7),
    ("Request", 15),
    ("User", 12),
];

pub fn event_table(events: &[Event], style: Style) -> String {
    if events.is_empty() {
        return format!(
            "No events found\n{}\n",
            style.paint("Try adjusting your filters", Tone::Muted)
        );
    }

    let header: Vec<String> = COLUMNS.iter().map(|(name, width)| fit(name, *width)).collect();
    let mut out = style.bold(header.join("  ").trim_end());
    out.push('\n');

    for event in events {
        let level = event.level.as_deref().unwrap_or("");
        let cells = [
            fit(&format_timestamp(&event.timestamp), COLUMNS[0].1),
            fit(&event.service, COLUMNS[1].1),
            fit(&event.name, COLUMNS[2].1),
            style.paint(&fit(level, COLUMNS[3].1), level_tone(level)),
            fit(&short_id(event.request_id.as_deref()), COLUMNS[4].1),
            event.user_id.clone().unwrap_or_else(|| "-".to_string()),
        ];
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// The expanded view of one event: every present field and the data
/// payload as pretty JSON.
pub fn event_detail(event: &Event) -> String {
    let mut out = String::new();
    let fields = [
        ("timestamp", Some(event.timestamp.as_str())),
        ("service", Some(event.service.as_str())),
        ("name", Some(event.name.as_str())),
        ("env", event.env.as_deref()),
        ("level", event.level.as_deref()),
        ("job_id", event.job_id.as_deref()),
        ("request_id", event.request_id.as_deref()),
        ("trace_id", event.trace_id.as_deref()),
        ("user_id", event.user_id.as_deref()),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("{name}: {value}\n"));
        }
    }
    if let Some(data) = &event.data {
        // Key order is not stable in a HashMap.
        let data: std::collections::BTreeMap<_, _> = data.iter().collect();
        if let Ok(json) = serde_json::to_string_pretty(&data) {
            out.push_str(&format!("data: {json}\n"));
        }
    }
    out
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn event() -> Event {
        Event {
            timestamp: "not a timestamp".to_string(),
            service: "users".to_string(),
            name: "login".to_string(),
            level: Some("error".to_string()),
            request_id: Some("0123456789abcdef".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_table() {
        let out = event_table(&[event()], Style::PLAIN);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Timestamp"));
        assert!(lines[1].starts_with("not a timestamp"));
        assert!(lines[1].contains("0123456789ab..."));
        assert!(lines[1].ends_with('-'));
    }

    #[test]
    fn test_empty_table() {
        assert!(event_table(&[], Style::PLAIN).starts_with("No events found"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(short_id(None), "-");
        assert_eq!(short_id(Some("")), "-");
        assert_eq!(short_id(Some("abc")), "abc...");
        assert_eq!(level_tone("WARNING"), Tone::Amber);
        assert_eq!(level_tone("info"), Tone::Blue);
    }

    #[test]
    fn test_detail() {
        let mut event = event();
        let mut data = HashMap::new();
        data.insert("duration".to_string(), serde_json::json!(120));
        event.data = Some(data);
        let out = event_detail(&event);
        assert!(out.contains("level: error\n"));
        assert!(!out.contains("env:"));
        assert!(out.contains("\"duration\": 120"));
    }
}

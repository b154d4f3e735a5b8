// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::Interval;

/// The relative time windows offered by the analytics pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Last1Hour,
    Last6Hours,
    #[default]
    Last24Hours,
    Last7Days,
    Last30Days,
}

/// A resolved window as ISO-8601 UTC timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub from: String,
    pub to: String,
}

const HOUR: u64 = 3600;
const DAY: u64 = HOUR * 24;

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Last1Hour,
        TimeRange::Last6Hours,
        TimeRange::Last24Hours,
        TimeRange::Last7Days,
        TimeRange::Last30Days,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Last1Hour => "Last 1 hour",
            TimeRange::Last6Hours => "Last 6 hours",
            TimeRange::Last24Hours => "Last 24 hours",
            TimeRange::Last7Days => "Last 7 days",
            TimeRange::Last30Days => "Last 30 days",
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(match self {
            TimeRange::Last1Hour => HOUR,
            TimeRange::Last6Hours => HOUR * 6,
            TimeRange::Last24Hours => DAY,
            TimeRange::Last7Days => DAY * 7,
            TimeRange::Last30Days => DAY * 30,
        })
    }

    /// Default bucket size for time series over this window.
    pub fn interval(&self) -> Interval {
        match self {
            TimeRange::Last1Hour => Interval::Minute,
            TimeRange::Last6Hours | TimeRange::Last24Hours | TimeRange::Last7Days => Interval::Hour,
            TimeRange::Last30Days => Interval::Day,
        }
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> Window {
        let from = match chrono::Duration::from_std(self.duration()) {
            Ok(duration) => now - duration,
            Err(_) => now,
        };
        Window {
            from: from.to_rfc3339_opts(SecondsFormat::Millis, true),
            to: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    /// Accepts a label (`Last 24 hours`) or a duration (`24h`, `7d`,
    /// `1day`) matching one of the windows exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(range) = Self::ALL.iter().find(|r| r.label().eq_ignore_ascii_case(s)) {
            return Ok(*range);
        }
        let duration =
            humantime::parse_duration(s).map_err(|_| format!("invalid time range: {s}"))?;
        Self::ALL
            .iter()
            .find(|r| r.duration() == duration)
            .copied()
            .ok_or_else(|| format!("unsupported time range: {s}"))
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_interval() {
        assert_eq!(TimeRange::Last24Hours.interval(), Interval::Hour);
        assert_eq!(TimeRange::Last1Hour.interval(), Interval::Minute);
        assert_eq!(TimeRange::Last30Days.interval(), Interval::Day);
        assert_eq!(TimeRange::Last7Days.interval(), Interval::Hour);
        assert_eq!(TimeRange::default(), TimeRange::Last24Hours);
    }

    #[test]
    fn test_resolve() {
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 12, 30, 0).unwrap();
        let window = TimeRange::Last24Hours.resolve(now);
        assert_eq!(window.from, "2025-03-01T12:30:00.000Z");
        assert_eq!(window.to, "2025-03-02T12:30:00.000Z");
        let window = TimeRange::Last30Days.resolve(now);
        assert_eq!(window.from, "2025-01-31T12:30:00.000Z");
    }

    #[test]
    fn test_parse() {
        assert_eq!("1h".parse::<TimeRange>(), Ok(TimeRange::Last1Hour));
        assert_eq!("24h".parse::<TimeRange>(), Ok(TimeRange::Last24Hours));
        assert_eq!("1day".parse::<TimeRange>(), Ok(TimeRange::Last24Hours));
        assert_eq!("7d".parse::<TimeRange>(), Ok(TimeRange::Last7Days));
        assert_eq!("last 6 hours".parse::<TimeRange>(), Ok(TimeRange::Last6Hours));
        assert!("2h".parse::<TimeRange>().is_err());
        assert!("soon".parse::<TimeRange>().is_err());
    }
}

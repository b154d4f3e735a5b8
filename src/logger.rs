// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::sync::OnceLock;

use time::macros::format_description;
use time::UtcOffset;
pub use tracing::debug;
pub use tracing::error;
pub use tracing::info;
pub use tracing::trace;
pub use tracing::warn;
use tracing::Level;
use tracing_subscriber::fmt::time::OffsetTime;

static OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Capture the local UTC offset. Must be called before the runtime
/// starts any threads, otherwise the offset can not be determined and
/// log timestamps fall back to UTC.
pub fn init_offset() {
    if let Ok(offset) = UtcOffset::current_local_offset() {
        let _ = OFFSET.set(offset);
    }
}

/// Map the number of -v flags to a log level.
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_logger(level: Level) {
    let level = match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    };

    let timer = OffsetTime::new(
        OFFSET.get().copied().unwrap_or(UtcOffset::UTC),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    );

    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(format!("{level},hyper=off,hyper_util=off,reqwest=info"))
        .with_writer(std::io::stderr)
        .with_timer(timer);

    #[cfg(target_os = "windows")]
    let builder = builder.with_ansi(false);

    if tracing::subscriber::set_global_default(builder.finish()).is_err() {
        eprintln!("logging already initialized");
    }
}

pub fn init_stdlog() {
    let _ = tracing_log::LogTracer::builder()
        .with_max_level(log::LevelFilter::Info)
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0), Level::INFO);
        assert_eq!(level_from_verbosity(1), Level::DEBUG);
        assert_eq!(level_from_verbosity(5), Level::TRACE);
    }
}

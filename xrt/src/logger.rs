//! Stderr logger
//!
//! Level is taken from `NANDRT_LOG` (`off`, `error`, `warn`, `info`,
//! `debug`, `trace`), defaulting to `warn`.

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level
pub const LOG_ENV: &str = "NANDRT_LOG";

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let tag = match record.level() {
                Level::Error => 'E',
                Level::Warn => 'W',
                Level::Info => 'I',
                Level::Debug => 'D',
                Level::Trace => 'T',
            };
            eprintln!("[{tag}] {}", record.args())
        }
    }

    fn flush(&self) {}
}

/// Level from the environment, raised to at least `floor`
pub fn level(floor: LevelFilter) -> LevelFilter {
    parse_level(std::env::var(LOG_ENV).ok().as_deref(), floor)
}

/// Level named by `value`, `warn` when absent or invalid, at least `floor`
pub fn parse_level(value: Option<&str>, floor: LevelFilter) -> LevelFilter {
    let level = value.and_then(|v| match v.parse() {
        Ok(level) => Some(level),
        Err(_) => {
            eprintln!("[W] {LOG_ENV}={v} is not a log level");
            None
        }
    });

    level.unwrap_or(LevelFilter::Warn).max(floor)
}

/// Install the logger, later calls keep the first one
pub fn init(level: LevelFilter) {
    static LOGGER: Logger = Logger;
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_warn() {
        assert_eq!(parse_level(None, LevelFilter::Off), LevelFilter::Warn);
        assert_eq!(parse_level(Some("loud"), LevelFilter::Off), LevelFilter::Warn);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(parse_level(Some("trace"), LevelFilter::Off), LevelFilter::Trace);
        assert_eq!(parse_level(Some("ERROR"), LevelFilter::Off), LevelFilter::Error);
        assert_eq!(parse_level(Some("off"), LevelFilter::Off), LevelFilter::Off);
    }

    #[test]
    fn floor_raises_level() {
        assert_eq!(parse_level(None, LevelFilter::Debug), LevelFilter::Debug);
        assert_eq!(parse_level(Some("error"), LevelFilter::Debug), LevelFilter::Debug);
        assert_eq!(parse_level(Some("trace"), LevelFilter::Debug), LevelFilter::Trace);
    }
}

//! Routes engine log entries into the `log` facade so `RUST_LOG` controls
//! engine and demo output alike

use mrt_engine::mrt::log::{LogEntry, LogSeverity, Logger};

pub struct LogBridge;

pub fn level_for(severity: LogSeverity) -> log::Level {
    match severity {
        LogSeverity::Trace => log::Level::Trace,
        LogSeverity::Debug => log::Level::Debug,
        LogSeverity::Info => log::Level::Info,
        LogSeverity::Warn => log::Level::Warn,
        LogSeverity::Error => log::Level::Error,
    }
}

/// Lowest engine severity that can pass `filter`
pub fn min_severity_for(filter: log::LevelFilter) -> LogSeverity {
    match filter {
        log::LevelFilter::Trace => LogSeverity::Trace,
        log::LevelFilter::Debug => LogSeverity::Debug,
        log::LevelFilter::Info => LogSeverity::Info,
        log::LevelFilter::Warn => LogSeverity::Warn,
        log::LevelFilter::Error | log::LevelFilter::Off => LogSeverity::Error,
    }
}

impl Logger for LogBridge {
    fn log(&self, entry: &LogEntry) {
        let level = level_for(entry.severity);
        let logger = log::logger();
        let metadata = log::Metadata::builder().level(level).target(&entry.source).build();
        if !logger.enabled(&metadata) {
            return;
        }
        logger.log(
            &log::Record::builder()
                .metadata(metadata)
                .args(format_args!("{}", entry.message))
                .file(entry.file)
                .line(entry.line)
                .build(),
        );
    }
}

/// Initialize `env_logger` (RUST_LOG, default info) and install the bridge
pub fn init_logging() {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Info);
        }
    }
    builder.init();

    mrt_engine::mrt::Engine::set_min_severity(min_severity_for(log::max_level()));
    mrt_engine::mrt::Engine::set_logger(LogBridge);
    log::debug!("logging initialized");
}

#[cfg(test)]
#[path = "log_bridge_tests.rs"]
mod tests;

//! Logging utilities

use std::time::Duration;

/// Logging setup and common log lines
pub struct Logger;

impl Logger {
    /// Initialize logger with specified level
    pub fn init(level: log::LevelFilter) {
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .format_timestamp_secs()
            .init();
    }

    /// Parse a level name, falling back to `Warn` for unknown names
    pub fn parse_level(level: &str) -> log::LevelFilter {
        level.parse().unwrap_or(log::LevelFilter::Warn)
    }

    /// Log the number of addresses a target expanded to
    pub fn log_resolved(target: &str, addresses: usize) {
        log::info!("Resolved {} to {} addresses", target, addresses);
    }

    /// Log run completion
    pub fn log_run_complete(duration: Duration, hosts: usize, records: usize) {
        log::info!(
            "Wrote {} records for {} hosts in {:.2}s",
            records,
            hosts,
            duration.as_secs_f64()
        );
    }
}

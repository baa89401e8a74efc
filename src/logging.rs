//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout stays clean for `--format json|csv` output.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Pick the filter directive: `SCORELENS_LOG`, then `RUST_LOG`, then the
/// configured level.
pub fn filter_directive<F>(config: &LoggingConfig, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    set("SCORELENS_LOG")
        .or_else(|| set("RUST_LOG"))
        .unwrap_or_else(|| config.level.clone())
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init(config: &LoggingConfig) {
    let directive = filter_directive(config, |key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_precedence() {
        let config = LoggingConfig {
            level: "info".to_string(),
        };

        let both = |key: &str| match key {
            "SCORELENS_LOG" => Some("debug".to_string()),
            "RUST_LOG" => Some("trace".to_string()),
            _ => None,
        };
        assert_eq!(filter_directive(&config, both), "debug");

        let rust_only = |key: &str| (key == "RUST_LOG").then(|| "scorelens=trace".to_string());
        assert_eq!(filter_directive(&config, rust_only), "scorelens=trace");

        assert_eq!(filter_directive(&config, |_| None), "info");
    }
}

//! Structured logging setup for scenario runs.
//!
//! Page objects and fixtures emit `tracing` events; a runner installs a
//! subscriber once with [`init`]. The filter comes from `SHOP_PROBE_LOG`,
//! then `RUST_LOG`, then [`DEFAULT_FILTER`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable consulted first for the log filter
pub const LOG_ENV_VAR: &str = "SHOP_PROBE_LOG";

/// Filter used when no environment variable is set
pub const DEFAULT_FILTER: &str = "shop_probe=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one line per event
    #[default]
    Compact,
    /// One JSON object per event, for CI log collectors
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which happens
/// when several test binaries share a process-wide setup helper.
pub fn init(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer();
    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }

    #[test]
    fn test_format_from_yaml() {
        let format: LogFormat = serde_yaml_ng::from_str("json").unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        let _ = init(LogFormat::Compact);
        assert!(!init(LogFormat::Json));
    }
}

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggerConfig;

/// Initializes the one process-wide subscriber every component logs
/// through. `handler_type` selects `json` (production) or anything else for
/// human-readable text (local dev); `log_level` is a standard tracing
/// filter directive (`debug`, `info`, ...).
pub fn init(config: &LoggerConfig) {
    let filter = EnvFilter::try_new(config.log_level()).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.handler_type() == "json" {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use crate::env::get_env_bool;

/// Installs the global subscriber. Filtering goes through RUST_LOG, LOG_JSON switches to one JSON
/// object per line for the log collector, LOG_PERF adds span close timings.
pub fn init() {
    let builder = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    let builder = if get_env_bool("LOG_PERF").unwrap_or(false) {
        builder.with_span_events(FmtSpan::CLOSE)
    } else {
        builder
    };

    if get_env_bool("LOG_JSON").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    };
}

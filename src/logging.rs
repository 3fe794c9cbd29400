//! Subscriber setup for binaries and tests that embed the key engine.
//!
//! Library code only emits `tracing` events (derivation, cache hits and
//! retryable failures at debug/trace). Secrets are never recorded.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment switch for JSON lines instead of the pretty format.
pub const JSON_ENV: &str = "HDKEYS_LOG_JSON";

/// Install a global subscriber honouring `RUST_LOG` (default `info`).
/// Later calls are no-ops.
pub fn init_logging() {
    init_logging_with("info");
}

/// Same as [`init_logging`] with a different fallback filter, e.g.
/// `"btc_hdkeys=trace"` to follow every derivation step.
pub fn init_logging_with(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = if json_requested() {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
}

fn json_requested() -> bool {
    std::env::var(JSON_ENV).map(|value| value == "1").unwrap_or(false)
}

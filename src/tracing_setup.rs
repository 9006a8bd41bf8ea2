//! Structured logging setup
//!
//! Console logging via tracing-subscriber with RUST_LOG filtering.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber
///
/// Configuration via environment variables:
/// - RUST_LOG: Log level filter (default: info)
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

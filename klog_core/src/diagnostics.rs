//! Internal diagnostics for the logger itself.
//!
//! Backend switches and swallowed write errors are reported through
//! `tracing`. These helpers install a stderr subscriber so those reports
//! never mix with log records written to stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize diagnostics at `warn`, overridable with RUST_LOG
pub fn init() {
    init_with_level("warn")
}

/// Initialize diagnostics with a specific default level
///
/// # Arguments
/// * `default_level` - Default level (debug, info, warn, error)
///
/// This can still be overridden by the RUST_LOG environment variable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize diagnostics for testing (captured in test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}

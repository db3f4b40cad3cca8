//! Development-time tracing for debugging the assistant.
//!
//! Diagnostics go to stderr so they never mix with rendered model output on
//! stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn` (or `duet=debug` when the CLI ran
/// with `--verbose`). Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=duet=debug duet "explain this project"
/// ```
pub fn init(verbose: bool) {
    let default_filter = if verbose { "duet=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

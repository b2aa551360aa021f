//! Structured-logging setup for worker binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes a global `tracing` subscriber: JSON-formatted events, with
/// the filter driven by `RUST_LOG` (falling back to `info`).
///
/// Call once, from `main`, before anything else runs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();
}

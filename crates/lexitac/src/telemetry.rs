//! Tracing subscriber setup for the server binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber: a `fmt` layer filtered by `RUST_LOG`,
/// falling back to `info`.
///
/// For example `RUST_LOG=debug,lexitac_room=trace` shows every rotation
/// tick.
pub fn init() {
    let fmt_layer = fmt::layer().with_target(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

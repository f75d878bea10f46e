//! Logging setup.
//!
//! Every crate in the workspace logs through `tracing`. Binaries call
//! [`init`] once at startup to print those events to stderr.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or by
/// `default_directive` (e.g. `"souk=info"`) when `RUST_LOG` is unset or
/// invalid.
///
/// Returns `false` if a global subscriber was already installed; the
/// existing one is kept.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

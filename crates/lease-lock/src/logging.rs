//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! application's call. These helpers give the same stderr output the rest of the
//! ecosystem's binaries use, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

/// `directives` when present and valid, `info` otherwise.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install a global fmt subscriber writing to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn try_init() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
}

/// Like [`try_init`], ignoring an already-installed subscriber.
pub fn init() {
    if try_init().is_err() {
        tracing::debug!("Global tracing subscriber already installed");
    }
}

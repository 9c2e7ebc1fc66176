//! Subscriber setup for binaries and tests embedding the storage layer.

/// Installs a global `tracing` subscriber writing to stdout.
///
/// `RUST_LOG` takes precedence; otherwise events of this crate at `level`
/// and above are printed.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cms_persistence={},mongodb=warn", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

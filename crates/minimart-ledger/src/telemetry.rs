//! Logging bootstrap.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,minimart=debug,sqlx=warn";

/// Installs the global `tracing` subscriber.
///
/// Honours `RUST_LOG`. Calling it again (tests, embedding hosts) is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

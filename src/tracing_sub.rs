use std::io;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber: compact stderr output, filterable
/// via `RUST_LOG`, defaulting to `info`. Safe to call multiple times;
/// subsequent calls are no-ops for the global subscriber.
pub fn init_default() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
}

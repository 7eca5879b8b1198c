//! Tracing subscriber setup for embedding applications and test binaries.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber with structured JSON output.
///
/// Respects the `OPENMEMORY_LOG` environment variable for filtering;
/// defaults to `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("OPENMEMORY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .init();
}

/// Initializes tracing with an explicit filter string, for tests that want
/// visibility into a single module without inheriting the environment.
pub fn init_tracing_with_filter(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .init();
}

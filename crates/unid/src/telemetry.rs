//! Tracing setup for the CLI and daemon.

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "UNID_LOG";

/// Installs the global subscriber, filtered by `UNID_LOG` (falling
/// back to `default_level`), writing to stderr so command output on
/// stdout stays machine-readable.
pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

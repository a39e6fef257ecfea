//! tracing setup for wineditionctl
//!
//! Logs go to stderr so stdout stays parseable with --json.

use tracing_subscriber::EnvFilter;

/// Overrides the configured level, e.g. `WINEDITION_LOG=winedition=debug`
pub const LOG_ENV: &str = "WINEDITION_LOG";

pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

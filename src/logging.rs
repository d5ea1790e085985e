use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log filter, e.g. `MOVR_LOG=movr_library=debug`.
const LOG_ENV: &str = "MOVR_LOG";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Logs go to stderr so that command output on
/// stdout stays clean.
pub fn init(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false).compact();
    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

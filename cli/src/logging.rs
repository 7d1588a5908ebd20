//! Diagnostic logging for the command-line tools.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Installs a compact stderr subscriber.
///
/// `RUST_LOG` overrides the default `warn` level, e.g.
/// `RUST_LOG=argparse_core=debug` traces token routing.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

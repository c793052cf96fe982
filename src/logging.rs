//! Structured logging to stderr.
//!
//! stdout carries command output (URLs, listings) so it can be piped; all
//! diagnostics go to stderr through `tracing`. `RUST_LOG` wins over the
//! built-in filter when set.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,snaplink=info";
const VERBOSE_FILTER: &str = "debug";

/// The filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

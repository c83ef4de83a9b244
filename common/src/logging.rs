//! Logging bootstrap
//!
//! Installs the `tracing` subscriber used by the RRC SAP crates.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with the given default level (trace, debug, info, warn, error).
///
/// `RUST_LOG` overrides the level when set. Returns `false` if a global
/// subscriber was already installed, which makes repeated calls from tests harmless.
pub fn init_logging(level: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .map(|_| tracing::debug!("Logging initialized with default level {}", level))
        .is_ok()
}

//! Logging utilities for foundry-responses
//!
//! Re-exports tracing macros with log_* naming convention for consistency,
//! and installs the stderr subscriber used by the binaries.

// Re-export tracing macros with log_* naming
pub use tracing::{
    debug as log_debug,
    error as log_error,
    info as log_info,
    trace as log_trace,
    warn as log_warn,
};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
///
/// Off, so a failed run prints only the `Error:` line from the binary.
pub const DEFAULT_LOG_FILTER: &str = "off";

/// Install a formatted subscriber writing to stderr.
///
/// Stdout is reserved for the response report, so log lines never go there.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` when set and valid, [`DEFAULT_LOG_FILTER`] otherwise.
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

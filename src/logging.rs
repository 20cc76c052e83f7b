//! Logging setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level; a verbose run forces `debug` over both.

use crate::config::LogLevel;
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::new(level.as_str())
}

/// Filter for a run at `level`
pub fn build_filter(level: LogLevel, verbose: bool) -> EnvFilter {
    if verbose {
        return default_filter(LogLevel::Debug);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level))
}

/// Initialize the global subscriber, logging to stderr
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: LogLevel, verbose: bool) -> Result<()> {
    let filter = build_filter(level, verbose);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::internal(format!("failed to initialize logging: {e}")))
}

//! # Logging
//!
//! `tracing` subscriber setup driven by [`ControllerConfig`].

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::ControllerConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured log level.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init(config: &ControllerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_format.eq_ignore_ascii_case("json") {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
    } else {
        builder
            .with_ansi(config.log_enable_color)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
    }
}

/// Directive enabling `level` for this crate only
fn default_directive(level: &str) -> String {
    format!("composite_connection={}", level.to_lowercase())
}

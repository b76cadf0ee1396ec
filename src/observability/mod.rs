//! # Observability
//!
//! - `logging`: tracing subscriber setup
//! - `metrics`: Prometheus metrics collection

pub mod logging;
pub mod metrics;

use anyhow::Result;

use crate::config::ControllerConfig;

/// Install logging and, when enabled, register metrics.
/// Call once at process start.
///
/// # Errors
/// Fails if a subscriber is already installed or metrics are already registered.
pub fn init(config: &ControllerConfig) -> Result<()> {
    logging::init(config)?;
    if config.enable_metrics {
        metrics::register_metrics()?;
    }
    Ok(())
}

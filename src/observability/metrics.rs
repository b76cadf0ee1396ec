//! # Metrics
//!
//! Prometheus metrics for connection detail handling.
//!
//! ## Metrics Exposed
//!
//! - `connection_details_fetched_total` - Total number of connection details fetched from composed resources
//! - `connection_details_published_total` - Total number of connection details written to secret stores
//! - `connection_publish_errors_total` - Total number of failed secret store writes
//! - `connection_destinations_configured_total` - Total number of composites given a default publish destination

use anyhow::Result;
use prometheus::{IntCounter, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static CONNECTION_DETAILS_FETCHED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "connection_details_fetched_total",
        "Total number of connection details fetched from composed resources",
    )
    .expect("Failed to create CONNECTION_DETAILS_FETCHED_TOTAL metric - this should never happen")
});

static CONNECTION_DETAILS_PUBLISHED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "connection_details_published_total",
        "Total number of connection details written to secret stores",
    )
    .expect("Failed to create CONNECTION_DETAILS_PUBLISHED_TOTAL metric - this should never happen")
});

static CONNECTION_PUBLISH_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "connection_publish_errors_total",
        "Total number of failed secret store writes",
    )
    .expect("Failed to create CONNECTION_PUBLISH_ERRORS_TOTAL metric - this should never happen")
});

static CONNECTION_DESTINATIONS_CONFIGURED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "connection_destinations_configured_total",
        "Total number of composite resources given a default publish destination",
    )
    .expect(
        "Failed to create CONNECTION_DESTINATIONS_CONFIGURED_TOTAL metric - this should never happen",
    )
});

/// Register all metrics with [`REGISTRY`]
///
/// # Errors
/// Fails if a metric is already registered.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CONNECTION_DETAILS_FETCHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CONNECTION_DETAILS_PUBLISHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CONNECTION_PUBLISH_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CONNECTION_DESTINATIONS_CONFIGURED_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_connection_details_fetched(count: usize) {
    CONNECTION_DETAILS_FETCHED_TOTAL.inc_by(count as u64);
}

pub fn increment_connection_details_published(count: usize) {
    CONNECTION_DETAILS_PUBLISHED_TOTAL.inc_by(count as u64);
}

pub fn increment_publish_errors() {
    CONNECTION_PUBLISH_ERRORS_TOTAL.inc();
}

pub fn increment_destinations_configured() {
    CONNECTION_DESTINATIONS_CONFIGURED_TOTAL.inc();
}

#[cfg(test)]
pub(crate) fn publish_errors_total() -> u64 {
    CONNECTION_PUBLISH_ERRORS_TOTAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increase() {
        let before = CONNECTION_DETAILS_FETCHED_TOTAL.get();
        increment_connection_details_fetched(3);
        assert!(CONNECTION_DETAILS_FETCHED_TOTAL.get() >= before + 3);
    }

    #[test]
    fn test_registered_metric_names() {
        let registry = Registry::new();
        registry
            .register(Box::new(CONNECTION_DESTINATIONS_CONFIGURED_TOTAL.clone()))
            .expect("register");
        increment_destinations_configured();

        let text = prometheus::TextEncoder::new()
            .encode_to_string(&registry.gather())
            .expect("encode");
        assert!(text.contains("# TYPE connection_destinations_configured_total counter"));
    }
}

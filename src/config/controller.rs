//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{DEFAULT_CONNECTION_SECRET_NAMESPACE, DEFAULT_STORE_CONFIG_NAME};

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace for connection secrets whose owner is cluster-scoped
    pub connection_secret_namespace: String,
    /// Store config used when a publish destination has no `configRef`
    pub default_store_config: String,
    /// Default allow-list for store publishers (empty allows every key)
    pub connection_details_filter: Vec<String>,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            connection_secret_namespace: DEFAULT_CONNECTION_SECRET_NAMESPACE.to_string(),
            default_store_config: DEFAULT_STORE_CONFIG_NAME.to_string(),
            connection_details_filter: Vec::new(),
            log_level: "INFO".to_string(),
            log_format: "json".to_string(),
            log_enable_color: false,
            enable_metrics: true,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            connection_secret_namespace: env_var_or_default_str(
                "POD_NAMESPACE",
                DEFAULT_CONNECTION_SECRET_NAMESPACE,
            ),
            default_store_config: env_var_or_default_str(
                "DEFAULT_STORE_CONFIG",
                DEFAULT_STORE_CONFIG_NAME,
            ),
            connection_details_filter: std::env::var("CONNECTION_DETAILS_FILTER")
                .map(|v| parse_filter(&v))
                .unwrap_or_default(),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "json"),
            log_enable_color: env_var_or_default_bool("LOG_ENABLE_COLOR", false),
            enable_metrics: env_var_or_default_bool("ENABLE_METRICS", true),
        }
    }
}

/// Split a comma-separated key list, dropping blanks
fn parse_filter(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| {
            let v_lower = v.to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

//! # Constants
//!
//! Shared constants used throughout the crate.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Namespace used for connection secrets of cluster-scoped owners
pub const DEFAULT_CONNECTION_SECRET_NAMESPACE: &str = "crossplane-system";

/// Store config used when a publish destination does not name one
pub const DEFAULT_STORE_CONFIG_NAME: &str = "default";

/// API group of the Composition custom resource
pub const COMPOSITION_GROUP: &str = "apiextensions.crossplane.io";

/// Field manager recorded on secrets written by the Kubernetes store
pub const FIELD_MANAGER: &str = "composite-connection";

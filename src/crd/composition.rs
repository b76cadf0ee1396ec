//! # Composition
//!
//! The Composition custom resource, read (never written) by this crate.

use serde::{Deserialize, Serialize};

use crate::crd::{ComposedTemplate, TypeReference};

/// Composition Custom Resource Definition
///
/// Describes how a composite resource type is assembled from composed
/// resources, and where its connection details go by default.
///
/// # Example
///
/// ```yaml
/// apiVersion: apiextensions.crossplane.io/v1
/// kind: Composition
/// metadata:
///   name: postgres-aws
/// spec:
///   compositeTypeRef:
///     apiVersion: database.example.org/v1alpha1
///     kind: XPostgreSQLInstance
///   publishConnectionDetailsWithStoreConfig: default
///   resources:
///     - name: rds
///       base: {}
///       connectionDetails:
///         - fromConnectionSecretKey: username
/// ```
#[derive(kube::CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "Composition",
    group = "apiextensions.crossplane.io",
    version = "v1",
    shortname = "comp"
)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSpec {
    /// Composite resource type this composition applies to
    pub composite_type_ref: TypeReference,
    /// Templates for the composed resources
    #[serde(default)]
    pub resources: Vec<ComposedTemplate>,
    /// Store config that composites publish to when they do not specify a
    /// destination themselves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_connection_details_with_store_config: Option<String>,
    /// Namespace for legacy connection secrets of composites. Not read here;
    /// typed so the object round-trips unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secrets_to_namespace: Option<String>,
}

impl CompositionSpec {
    /// Whether `api_version`/`kind` is the composite type this composition targets
    #[must_use]
    pub fn applies_to(&self, api_version: &str, kind: &str) -> bool {
        self.composite_type_ref.api_version == api_version && self.composite_type_ref.kind == kind
    }
}

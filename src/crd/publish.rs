//! # Publish Destinations
//!
//! Shared API types naming where connection details are written.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to a cluster-scoped object by name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub name: String,
}

/// Reference to a namespaced Kubernetes secret
///
/// Only carried so legacy `writeConnectionSecretToRef` fields round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub name: String,
    pub namespace: String,
}

/// Metadata applied to a published connection secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSecretMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    /// Secret type, e.g. `connection.crossplane.io/v1alpha1`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
}

/// Where a resource's connection details are published
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishConnectionDetailsTo {
    /// Name of the connection secret
    pub name: String,
    /// Store config the secret is written to; the default store when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_ref: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ConnectionSecretMetadata>,
}

impl PublishConnectionDetailsTo {
    /// Destination `name` in the store config `store`
    #[must_use]
    pub fn new(name: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_ref: Some(Reference { name: store.into() }),
            metadata: None,
        }
    }

    /// Store config name, falling back to `default`
    #[must_use]
    pub fn store_config_name<'a>(&'a self, default: &'a str) -> &'a str {
        self.config_ref.as_ref().map_or(default, |r| r.name.as_str())
    }
}

/// API version and kind a composition applies to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    pub api_version: String,
    pub kind: String,
}

//! # Unstructured Resources
//!
//! Typed view over arbitrary composite and composed objects. Only the fields
//! the connection pipeline touches are typed; everything else in `spec` is
//! carried through untouched.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use kube::core::TypeMeta;
use serde::{Deserialize, Serialize};

use crate::crd::{PublishConnectionDetailsTo, SecretReference};
use crate::resource::{Composed, Composite, ConnectionSecretOwner};

/// Connection-related spec fields shared by composite and composed resources
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_connection_details_to: Option<PublishConnectionDetailsTo>,
    /// Legacy in-cluster connection secret. Not read here; typed so the
    /// object round-trips unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
    /// Remaining spec fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// An object of any kind, with connection fields typed
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Unstructured {
    #[serde(flatten)]
    pub types: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ConnectionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

impl Unstructured {
    /// Empty object of the given type
    #[must_use]
    pub fn new(api_version: &str, kind: &str, name: &str) -> Self {
        Self {
            types: TypeMeta {
                api_version: api_version.to_string(),
                kind: kind.to_string(),
            },
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            spec: ConnectionSpec::default(),
            status: None,
        }
    }

    /// Convert into a [`DynamicObject`] for the dynamic API
    ///
    /// # Errors
    /// Returns an error if the object cannot be represented as JSON.
    pub fn to_dynamic_object(&self) -> serde_json::Result<DynamicObject> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

impl TryFrom<DynamicObject> for Unstructured {
    type Error = serde_json::Error;

    fn try_from(obj: DynamicObject) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(obj)?)
    }
}

impl ConnectionSecretOwner for Unstructured {
    fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    fn publish_connection_details_to(&self) -> Option<&PublishConnectionDetailsTo> {
        self.spec.publish_connection_details_to.as_ref()
    }

    fn set_publish_connection_details_to(&mut self, dest: Option<PublishConnectionDetailsTo>) {
        self.spec.publish_connection_details_to = dest;
    }
}

impl Composed for Unstructured {}

impl Composite for Unstructured {
    fn api_version(&self) -> &str {
        &self.types.api_version
    }

    fn kind(&self) -> &str {
        &self.types.kind
    }

    fn uid(&self) -> &str {
        self.metadata.uid.as_deref().unwrap_or_default()
    }
}

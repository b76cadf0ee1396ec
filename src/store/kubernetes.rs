//! # Kubernetes Secret Store
//!
//! [`SecretStore`] backed by Kubernetes `Secret` objects.
//!
//! The destination secret lives in the owner's namespace, or in the default
//! connection secret namespace for cluster-scoped owners. Writes are
//! read-merge-write: existing keys not being published are kept and the
//! destination's labels, annotations and type are applied on top.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Api, PostParams};
use kube::Client;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::connection::ConnectionDetails;
use crate::constants::{DEFAULT_CONNECTION_SECRET_NAMESPACE, FIELD_MANAGER};
use crate::context::Context;
use crate::crd::PublishConnectionDetailsTo;
use crate::resource::ConnectionSecretOwner;
use crate::store::SecretStore;

/// Connection secrets stored as Kubernetes secrets
#[derive(Clone)]
pub struct KubernetesSecretStore {
    client: Client,
    default_namespace: String,
}

impl std::fmt::Debug for KubernetesSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesSecretStore")
            .field("default_namespace", &self.default_namespace)
            .finish_non_exhaustive()
    }
}

impl KubernetesSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_default_namespace(client, DEFAULT_CONNECTION_SECRET_NAMESPACE)
    }

    /// Store writing secrets of cluster-scoped owners to `namespace`
    #[must_use]
    pub fn with_default_namespace(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            default_namespace: namespace.into(),
        }
    }

    /// Store using the configured connection secret namespace
    #[must_use]
    pub fn from_config(client: Client, config: &ControllerConfig) -> Self {
        Self::with_default_namespace(client, config.connection_secret_namespace.as_str())
    }

    fn secrets_for<'a>(
        &'a self,
        owner: &'a dyn ConnectionSecretOwner,
    ) -> (Api<Secret>, &'a str) {
        let namespace = owner.namespace().unwrap_or(&self.default_namespace);
        (Api::namespaced(self.client.clone(), namespace), namespace)
    }
}

/// Decode secret data into connection details
fn details_from_secret(secret: &Secret) -> ConnectionDetails {
    secret
        .data
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), v.0.clone()))
        .collect()
}

/// Merge `details` and the destination metadata into `secret`.
/// Returns whether the secret changed.
fn apply_connection(
    secret: &mut Secret,
    dest: &PublishConnectionDetailsTo,
    details: &ConnectionDetails,
) -> bool {
    let before = secret.clone();

    let data = secret.data.get_or_insert_with(BTreeMap::new);
    for (key, value) in details {
        data.insert(key.clone(), ByteString(value.clone()));
    }

    if let Some(meta) = &dest.metadata {
        if let Some(labels) = &meta.labels {
            secret
                .metadata
                .labels
                .get_or_insert_with(BTreeMap::new)
                .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(annotations) = &meta.annotations {
            secret
                .metadata
                .annotations
                .get_or_insert_with(BTreeMap::new)
                .extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(secret_type) = &meta.secret_type {
            secret.type_ = Some(secret_type.clone());
        }
    }

    *secret != before
}

fn new_secret(name: &str, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..ObjectMeta::default()
        },
        ..Secret::default()
    }
}

#[async_trait]
impl SecretStore for KubernetesSecretStore {
    async fn read_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
    ) -> Result<Option<ConnectionDetails>> {
        let Some(dest) = owner.publish_connection_details_to() else {
            return Ok(None);
        };
        let (secrets, namespace) = self.secrets_for(owner);

        let secret = ctx
            .run(secrets.get_opt(&dest.name))
            .await?
            .with_context(|| format!("Failed to get secret {namespace}/{}", dest.name))?;
        Ok(secret.as_ref().map(details_from_secret))
    }

    async fn write_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<()> {
        let dest = owner
            .publish_connection_details_to()
            .with_context(|| format!("{} has no publish destination", owner.name()))?;
        let (secrets, namespace) = self.secrets_for(owner);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PostParams::default()
        };

        let existing = ctx
            .run(secrets.get_opt(&dest.name))
            .await?
            .with_context(|| format!("Failed to get secret {namespace}/{}", dest.name))?;
        ctx.ensure_active()?;

        match existing {
            None => {
                let mut secret = new_secret(&dest.name, namespace);
                apply_connection(&mut secret, dest, details);
                ctx.run(secrets.create(&params, &secret))
                    .await?
                    .with_context(|| {
                        format!("Failed to create secret {namespace}/{}", dest.name)
                    })?;
                info!("Created connection secret '{}/{}'", namespace, dest.name);
            }
            Some(mut secret) => {
                if !apply_connection(&mut secret, dest, details) {
                    debug!(
                        "Connection secret '{}/{}' already up to date",
                        namespace, dest.name
                    );
                    return Ok(());
                }
                // Carries the resourceVersion we read; concurrent writers conflict.
                ctx.run(secrets.replace(&dest.name, &params, &secret))
                    .await?
                    .with_context(|| {
                        format!("Failed to update secret {namespace}/{}", dest.name)
                    })?;
                info!("Updated connection secret '{}/{}'", namespace, dest.name);
            }
        }
        Ok(())
    }
}

//! # Composite Updater
//!
//! Persists a mutated composite resource through the Kubernetes API.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, PostParams};
use kube::core::{GroupVersionKind, TypeMeta};
use kube::Client;
use tracing::debug;

use crate::constants::FIELD_MANAGER;
use crate::context::Context;
use crate::resource::Unstructured;

/// Persists a composite resource after it was mutated in memory
#[async_trait]
pub trait CompositeUpdater<C>: Send + Sync {
    /// Write `cp` back to the API server. Implementations may refresh `cp`
    /// with the persisted state (e.g. a new resource version).
    async fn update(&self, ctx: &Context, cp: &mut C) -> Result<()>;
}

/// [`CompositeUpdater`] backed by the dynamic Kubernetes API
#[derive(Clone)]
pub struct KubeCompositeUpdater {
    client: Client,
}

impl std::fmt::Debug for KubeCompositeUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCompositeUpdater").finish_non_exhaustive()
    }
}

impl KubeCompositeUpdater {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Derive the API resource for an object's `apiVersion` and `kind`.
/// The plural is guessed from the kind.
#[must_use]
pub fn api_resource_for(types: &TypeMeta) -> ApiResource {
    let (group, version) = types
        .api_version
        .split_once('/')
        .unwrap_or(("", types.api_version.as_str()));
    ApiResource::from_gvk(&GroupVersionKind::gvk(group, version, &types.kind))
}

#[async_trait]
impl CompositeUpdater<Unstructured> for KubeCompositeUpdater {
    async fn update(&self, ctx: &Context, cp: &mut Unstructured) -> Result<()> {
        let resource = api_resource_for(&cp.types);
        let name = cp
            .metadata
            .name
            .clone()
            .context("composite resource has no name")?;
        let api: Api<DynamicObject> = match cp.metadata.namespace.as_deref() {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        };

        let obj = cp.to_dynamic_object()?;
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PostParams::default()
        };
        let updated = ctx
            .run(api.replace(&name, &params, &obj))
            .await?
            .with_context(|| format!("failed to replace {} {name}", resource.kind))?;

        debug!(
            "Updated {} {} (resourceVersion={:?})",
            resource.kind, name, updated.metadata.resource_version
        );
        *cp = Unstructured::try_from(updated)?;
        Ok(())
    }
}

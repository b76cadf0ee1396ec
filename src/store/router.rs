//! # Store Config Router
//!
//! Routes reads and writes to the store registered under the store config
//! named by the owner's publish destination.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ControllerConfig;
use crate::connection::ConnectionDetails;
use crate::constants::DEFAULT_STORE_CONFIG_NAME;
use crate::context::Context;
use crate::resource::ConnectionSecretOwner;
use crate::store::SecretStore;

/// Dispatches to one of several stores by store config name
#[derive(Clone)]
pub struct StoreConfigRouter {
    stores: BTreeMap<String, Arc<dyn SecretStore>>,
    default_store_config: String,
}

impl std::fmt::Debug for StoreConfigRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfigRouter")
            .field("stores", &self.stores.keys().collect::<Vec<_>>())
            .field("default_store_config", &self.default_store_config)
            .finish()
    }
}

impl Default for StoreConfigRouter {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_CONFIG_NAME)
    }
}

impl StoreConfigRouter {
    /// Router using `default_store_config` for destinations without a config ref
    #[must_use]
    pub fn new(default_store_config: impl Into<String>) -> Self {
        Self {
            stores: BTreeMap::new(),
            default_store_config: default_store_config.into(),
        }
    }

    /// Router defaulting to the configured store config
    #[must_use]
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.default_store_config.as_str())
    }

    /// Register `store` under the store config `name`
    #[must_use]
    pub fn with_store(mut self, name: impl Into<String>, store: Arc<dyn SecretStore>) -> Self {
        self.stores.insert(name.into(), store);
        self
    }

    fn route(&self, owner: &dyn ConnectionSecretOwner) -> Result<Option<&Arc<dyn SecretStore>>> {
        let Some(dest) = owner.publish_connection_details_to() else {
            return Ok(None);
        };
        let name = dest.store_config_name(&self.default_store_config);
        match self.stores.get(name) {
            Some(store) => Ok(Some(store)),
            None => bail!("store config '{name}' is not registered"),
        }
    }
}

#[async_trait]
impl SecretStore for StoreConfigRouter {
    async fn read_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
    ) -> Result<Option<ConnectionDetails>> {
        match self.route(owner)? {
            Some(store) => store.read_connection(ctx, owner).await,
            None => Ok(None),
        }
    }

    async fn write_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<()> {
        match self.route(owner)? {
            Some(store) => store.write_connection(ctx, owner, details).await,
            None => bail!("{} has no publish destination", owner.name()),
        }
    }
}

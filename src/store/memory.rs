//! # In-Memory Secret Store
//!
//! Ephemeral [`SecretStore`]; data does not persist across restarts.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::connection::{merge_connection_details, ConnectionDetails};
use crate::constants::DEFAULT_STORE_CONFIG_NAME;
use crate::context::Context;
use crate::resource::ConnectionSecretOwner;
use crate::store::SecretStore;

/// In-memory secret store
///
/// Secrets are keyed by `<store config>/<namespace>/<name>` of the owner's
/// destination (`<store config>/<name>` for cluster-scoped owners), so equally
/// named destinations in different store configs never share an entry.
/// Thread-safe using Arc<RwLock> for concurrent access.
#[derive(Clone, Debug, Default)]
pub struct InMemorySecretStore {
    secrets: Arc<RwLock<HashMap<String, ConnectionDetails>>>,
}

impl InMemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }

    /// Read-only snapshot of every stored secret
    pub async fn snapshot(&self) -> HashMap<String, ConnectionDetails> {
        self.secrets.read().await.clone()
    }

    fn key_for(owner: &dyn ConnectionSecretOwner) -> Option<String> {
        let dest = owner.publish_connection_details_to()?;
        let store = dest.store_config_name(DEFAULT_STORE_CONFIG_NAME);
        Some(match owner.namespace() {
            Some(ns) => format!("{store}/{ns}/{}", dest.name),
            None => format!("{store}/{}", dest.name),
        })
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn read_connection(
        &self,
        _ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
    ) -> Result<Option<ConnectionDetails>> {
        let Some(key) = Self::key_for(owner) else {
            return Ok(None);
        };
        Ok(self.secrets.read().await.get(&key).cloned())
    }

    async fn write_connection(
        &self,
        _ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<()> {
        let key = Self::key_for(owner)
            .with_context(|| format!("{} has no publish destination", owner.name()))?;
        let mut secrets = self.secrets.write().await;
        merge_connection_details(secrets.entry(key).or_default(), details.clone());
        Ok(())
    }
}

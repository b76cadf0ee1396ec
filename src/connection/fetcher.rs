//! # Connection Details Fetchers
//!
//! Fan-out fetching across several fetchers, and the secret store backed
//! fetcher that reads a composed resource's connection secret.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::connection::{
    merge_connection_details, ConnectionDetails, ConnectionDetailsFetcher, ConnectionError,
    FetchError,
};
use crate::context::Context;
use crate::crd::{ComposedTemplate, ConnectionDetailType};
use crate::observability::metrics;
use crate::resource::Composed;
use crate::store::SecretStore;

/// Chains multiple fetchers. Fetchers run in order and later fetchers win
/// on key collisions.
#[derive(Clone, Default)]
pub struct ConnectionDetailsFetcherChain {
    fetchers: Vec<Arc<dyn ConnectionDetailsFetcher>>,
}

impl std::fmt::Debug for ConnectionDetailsFetcherChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDetailsFetcherChain")
            .field("fetchers", &self.fetchers.len())
            .finish()
    }
}

impl ConnectionDetailsFetcherChain {
    #[must_use]
    pub fn new(fetchers: Vec<Arc<dyn ConnectionDetailsFetcher>>) -> Self {
        Self { fetchers }
    }

    /// Append a fetcher with the highest priority so far
    #[must_use]
    pub fn with(mut self, fetcher: Arc<dyn ConnectionDetailsFetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }
}

#[async_trait]
impl ConnectionDetailsFetcher for ConnectionDetailsFetcherChain {
    async fn fetch_connection_details(
        &self,
        ctx: &Context,
        composed: &dyn Composed,
        template: &ComposedTemplate,
    ) -> Result<Option<ConnectionDetails>, FetchError> {
        let mut all = ConnectionDetails::new();
        for fetcher in &self.fetchers {
            if let Err(e) = ctx.ensure_active() {
                return Err(FetchError::from(e).with_partial(all));
            }

            match fetcher
                .fetch_connection_details(ctx, composed, template)
                .await
            {
                Ok(Some(conn)) => merge_connection_details(&mut all, conn),
                Ok(None) => {}
                Err(mut e) => {
                    if let Some(partial) = e.partial.take() {
                        merge_connection_details(&mut all, partial);
                    }
                    return Err(e.with_partial(all));
                }
            }
        }
        Ok(Some(all))
    }
}

/// Fetches connection details from the secret store, keeping only the keys a
/// template declares as `FromConnectionSecretKey`
#[derive(Clone)]
pub struct SecretStoreConnectionDetailsFetcher {
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for SecretStoreConnectionDetailsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStoreConnectionDetailsFetcher")
            .finish_non_exhaustive()
    }
}

impl SecretStoreConnectionDetailsFetcher {
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConnectionDetailsFetcher for SecretStoreConnectionDetailsFetcher {
    async fn fetch_connection_details(
        &self,
        ctx: &Context,
        composed: &dyn Composed,
        template: &ComposedTemplate,
    ) -> Result<Option<ConnectionDetails>, FetchError> {
        let data = ctx
            .run(self.store.read_connection(ctx, composed))
            .await?
            .map_err(|e| ConnectionError::from_collaborator(e, ConnectionError::FetchSecret))?;

        let mut conn = ConnectionDetails::new();
        for detail in &template.connection_details {
            match detail.effective_type() {
                t @ ConnectionDetailType::FromConnectionSecretKey => {
                    let Some(source_key) = detail.from_connection_secret_key.as_deref() else {
                        return Err(ConnectionError::MissingKeyReference { detail_type: t }.into());
                    };
                    // The key may still be written later, so absence is not an error.
                    let Some(value) = data.as_ref().and_then(|d| d.get(source_key)) else {
                        debug!(
                            "Connection secret of {} has no key '{}' yet, skipping",
                            composed.name(),
                            source_key
                        );
                        continue;
                    };
                    let key = detail.name.as_deref().unwrap_or(source_key);
                    if !key.is_empty() {
                        conn.insert(key.to_string(), value.clone());
                    }
                }
                // Field path and literal values are extracted from the API
                // object by another fetcher; unknown types cannot be resolved.
                ConnectionDetailType::FromFieldPath
                | ConnectionDetailType::FromValue
                | ConnectionDetailType::Unknown => {}
            }
        }

        if conn.is_empty() {
            return Ok(None);
        }

        metrics::increment_connection_details_fetched(conn.len());
        Ok(Some(conn))
    }
}

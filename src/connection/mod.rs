//! # Connection Details
//!
//! Fetching connection details from composed resources and publishing them
//! for a composite resource.
//!
//! - [`ConnectionDetailsFetcher`] / [`ConnectionDetailsFetcherChain`]
//! - [`ConnectionPublisher`] / [`ConnectionPublisherChain`]
//! - [`SecretStoreConnectionDetailsFetcher`] / [`SecretStoreConnectionPublisher`]
//! - [`ConnectionDetailsConfigurator`]

mod configurator;
mod error;
mod fetcher;
mod publisher;

pub use configurator::ConnectionDetailsConfigurator;
pub use error::{ConnectionError, FetchError, PublishError};
pub use fetcher::{ConnectionDetailsFetcherChain, SecretStoreConnectionDetailsFetcher};
pub use publisher::{ConnectionPublisherChain, SecretStoreConnectionPublisher};

use async_trait::async_trait;
use std::collections::HashMap;

use crate::context::Context;
use crate::crd::ComposedTemplate;
use crate::resource::{Composed, ConnectionSecretOwner};

/// Connection detail key to opaque value
pub type ConnectionDetails = HashMap<String, Vec<u8>>;

/// Fetches the connection details of one composed resource
#[async_trait]
pub trait ConnectionDetailsFetcher: Send + Sync {
    /// Returns `Ok(None)` when the resource has no details to contribute.
    async fn fetch_connection_details(
        &self,
        ctx: &Context,
        composed: &dyn Composed,
        template: &ComposedTemplate,
    ) -> Result<Option<ConnectionDetails>, FetchError>;
}

/// Publishes connection details for a resource
///
/// Publishing must be additive: publishing (a, b, c) and then (b, c, d)
/// updates b and c but keeps a. Publishers must accept empty details.
#[async_trait]
pub trait ConnectionPublisher: Send + Sync {
    /// Returns true if the publish was not a no-op.
    async fn publish_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<bool, PublishError>;
}

/// Merge `from` into `into`; values in `from` win on key collision
pub fn merge_connection_details(into: &mut ConnectionDetails, from: ConnectionDetails) {
    into.extend(from);
}

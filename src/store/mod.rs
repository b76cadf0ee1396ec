//! # Secret Stores
//!
//! Backends holding published connection secrets.
//!
//! Every store implements [`SecretStore`]:
//! - `InMemorySecretStore`: process-local, for tests and embedding
//! - `KubernetesSecretStore`: Kubernetes `Secret` objects
//! - `StoreConfigRouter`: dispatches on the destination's store config

mod kubernetes;
mod memory;
mod router;

pub use kubernetes::KubernetesSecretStore;
pub use memory::InMemorySecretStore;
pub use router::StoreConfigRouter;

use anyhow::Result;
use async_trait::async_trait;

use crate::connection::ConnectionDetails;
use crate::context::Context;
use crate::resource::ConnectionSecretOwner;

/// Store for connection secrets, addressed by the owner's publish destination
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Current payload of the owner's connection secret.
    /// `None` if the owner has no destination or the secret does not exist.
    async fn read_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
    ) -> Result<Option<ConnectionDetails>>;

    /// Merge `details` into the owner's connection secret, creating it if
    /// needed. Keys not in `details` are kept.
    async fn write_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<()>;
}

//! Commonly used types, for `use composite_connection::prelude::*`

pub use crate::config::ControllerConfig;
pub use crate::connection::{
    merge_connection_details, ConnectionDetails, ConnectionDetailsConfigurator,
    ConnectionDetailsFetcher, ConnectionDetailsFetcherChain, ConnectionError, ConnectionPublisher,
    ConnectionPublisherChain, FetchError, PublishError, SecretStoreConnectionDetailsFetcher,
    SecretStoreConnectionPublisher,
};
pub use crate::context::Context;
pub use crate::crd::{
    ComposedTemplate, Composition, CompositionSpec, ConnectionDetail, ConnectionDetailType,
    PublishConnectionDetailsTo,
};
pub use crate::resource::{
    Composed, Composite, CompositeUpdater, ConnectionSecretOwner, KubeCompositeUpdater,
    Unstructured,
};
pub use crate::store::{InMemorySecretStore, KubernetesSecretStore, SecretStore, StoreConfigRouter};

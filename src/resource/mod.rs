//! # Resources
//!
//! Capabilities the connection pipeline needs from the objects it handles.
//!
//! - [`ConnectionSecretOwner`]: anything that may own a published connection secret
//! - [`Composed`]: a composed resource; always a connection secret owner
//! - [`Composite`]: a composite resource with a GroupVersionKind and UID
//! - [`CompositeUpdater`]: persists a mutated composite resource

mod unstructured;
mod updater;

pub use unstructured::{ConnectionSpec, Unstructured};
pub use updater::{api_resource_for, CompositeUpdater, KubeCompositeUpdater};

use crate::crd::PublishConnectionDetailsTo;

/// A resource that may own a published connection secret
pub trait ConnectionSecretOwner: Send + Sync {
    /// Object name, used for diagnostics
    fn name(&self) -> &str;

    /// Namespace of a namespaced owner
    fn namespace(&self) -> Option<&str>;

    /// Where the owner's connection details are published, if anywhere
    fn publish_connection_details_to(&self) -> Option<&PublishConnectionDetailsTo>;

    fn set_publish_connection_details_to(&mut self, dest: Option<PublishConnectionDetailsTo>);
}

/// A resource composed into a composite resource
///
/// The owner facet is a supertrait so that fetchers reading a composed
/// resource's connection secret never need a runtime downcast.
pub trait Composed: ConnectionSecretOwner {}

/// A composite resource
pub trait Composite: ConnectionSecretOwner {
    /// `apiVersion`, e.g. `database.example.org/v1alpha1`
    fn api_version(&self) -> &str;

    fn kind(&self) -> &str;

    /// Object UID; empty before the object is first persisted
    fn uid(&self) -> &str;
}

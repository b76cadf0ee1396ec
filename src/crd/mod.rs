//! # Custom Resource Definitions
//!
//! API types consumed by the connection pipeline.
//!
//! ## Module Structure
//!
//! - `composition.rs` - The Composition custom resource
//! - `connection.rs` - Connection detail declarations and composed templates
//! - `publish.rs` - Publish destinations and object references

mod composition;
mod connection;
mod publish;

// Re-export all public types
pub use composition::{Composition, CompositionSpec};
pub use connection::{ComposedTemplate, ConnectionDetail, ConnectionDetailType};
pub use publish::{
    ConnectionSecretMetadata, PublishConnectionDetailsTo, Reference, SecretReference,
    TypeReference,
};

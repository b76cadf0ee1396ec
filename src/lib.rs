//! Composite Connection Library
//!
//! Connection detail aggregation and publication for composite resources.
//!
//! A composite resource is built from composed resources. Each composed
//! resource may expose connection details (endpoints, credentials) through its
//! own connection secret. This crate:
//!
//! - fetches those details through [`connection::ConnectionDetailsFetcher`]s
//! - publishes the aggregate through [`connection::ConnectionPublisher`]s
//! - defaults a composite's publish destination from its composition with
//!   [`connection::ConnectionDetailsConfigurator`]

pub mod config;
pub mod connection;
pub mod constants;
pub mod context;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod resource;
pub mod store;

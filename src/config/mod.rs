//! # Configuration
//!
//! Settings for the connection pipeline, loaded from environment variables.

mod controller;

pub use controller::ControllerConfig;

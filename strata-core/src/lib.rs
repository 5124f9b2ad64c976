//! Strata Core
//!
//! Core library for declaring infrastructure as a graph of descriptors whose
//! cross-resource values are deferred until an engine materializes them.

pub mod assert;
pub mod error;
pub mod output;
pub mod preview;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod transform;

pub use assert::assert_defined;
pub use error::{
    ConfigurationError, DefinitionError, DefinitionResult, RegistrationError,
    UpstreamResolutionError,
};
pub use output::{Output, Resolution, Resolver};
pub use registry::{RegisteredResource, Registry, ResourceOptions};
pub use resource::{Resource, ResourceId, Value};

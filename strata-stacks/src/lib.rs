//! Strata Stacks
//!
//! The stack definitions shipped with Strata and the configuration they read.

pub mod bucket;
pub mod cluster;
pub mod config;

use strata_core::error::DefinitionResult;
use strata_core::preview::PreviewRegistry;
use strata_core::registry::Registry;
use strata_provider_aws::AwsProvider;
use strata_provider_kubernetes::KubernetesProvider;

pub use config::StackConfig;

/// A stack definition that can be run against a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    Cluster,
    Bucket,
}

impl Stack {
    pub fn name(&self) -> &'static str {
        match self {
            Stack::Cluster => "cluster",
            Stack::Bucket => "bucket",
        }
    }

    /// Run the definition pass
    pub fn define(&self, registry: &mut dyn Registry, config: &StackConfig) -> DefinitionResult<()> {
        match self {
            Stack::Cluster => cluster::define(registry, config).map(|_| ()),
            Stack::Bucket => bucket::define(registry, config).map(|_| ()),
        }
    }
}

/// Preview registry with every provider the stacks use
pub fn preview_registry() -> PreviewRegistry {
    PreviewRegistry::new(vec![
        Box::new(AwsProvider::new()),
        Box::new(KubernetesProvider::new()),
    ])
}
